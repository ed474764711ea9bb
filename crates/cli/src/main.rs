use clap::{Parser, Subcommand};
use lib::bot::{Advance, Outcome, ReportBot, NO_SESSION_HINT, PREPARING_SUMMARY};
use lib::channels::{parse_command, Command};
use lib::summarize::Summarizer;

#[derive(Parser)]
#[command(name = "weekly-report")]
#[command(about = "Weekly report bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: WEEKLY_REPORT_CONFIG_PATH or ~/.weekly-report/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the gateway: Telegram channel (long-poll or webhook) and health endpoint.
    Gateway {
        /// Config file path (default: WEEKLY_REPORT_CONFIG_PATH or ~/.weekly-report/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 15152)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Fill in a report in the terminal, using the configured summarizer.
    Chat {
        /// Config file path (default: WEEKLY_REPORT_CONFIG_PATH or ~/.weekly-report/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("weekly-report {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    lib::gateway::run_gateway(config).await
}

const LOCAL_SESSION: &str = "local";

/// One line read from the terminal.
#[derive(Debug, PartialEq, Eq)]
enum ChatLine<'a> {
    Blank,
    Exit,
    Command(Command),
    /// Answer text, only the line terminator removed.
    Answer(&'a str),
}

fn classify_line(line: &str) -> ChatLine<'_> {
    let text = line.trim_end_matches(['\r', '\n']);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ChatLine::Blank;
    }
    if trimmed.eq_ignore_ascii_case("/exit") || trimmed.eq_ignore_ascii_case("/quit") {
        return ChatLine::Exit;
    }
    match parse_command(text) {
        Some(command) => ChatLine::Command(command),
        None => ChatLine::Answer(text),
    }
}

/// Feed one answer to the local session, emitting each reply in order.
async fn answer(bot: &ReportBot, text: &str, emit: &mut impl FnMut(&str)) {
    let outcome = match bot.step(LOCAL_SESSION, text).await {
        Advance::Reply(outcome) => outcome,
        Advance::Summarize(pending) => {
            emit(PREPARING_SUMMARY);
            bot.finish(pending).await
        }
    };
    match outcome {
        Outcome::Prompt(text) | Outcome::Summary(text) => emit(&text),
        Outcome::NoSession => emit(NO_SESSION_HINT),
        Outcome::Busy => emit(PREPARING_SUMMARY),
        Outcome::Discarded => {}
    }
}

async fn run_chat(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = lib::config::load_config(config_path)?;
    let summarizer = Summarizer::from_config(&config);
    if !summarizer.is_generative() {
        log::info!("no summarizer configured; the report will list the answers as given");
    }
    let bot = ReportBot::new(summarizer);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut say = |text: &str| println!("< {}", text.trim());

    say(&bot.begin(LOCAL_SESSION).await);
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        match classify_line(&line) {
            ChatLine::Blank => continue,
            ChatLine::Exit => break,
            ChatLine::Command(Command::Start) => say(&bot.begin(LOCAL_SESSION).await),
            ChatLine::Command(Command::Cancel) => say(&bot.cancel(LOCAL_SESSION).await),
            ChatLine::Command(Command::Other(name)) => {
                log::debug!("chat: ignoring command /{}", name);
            }
            ChatLine::Answer(text) => answer(&bot, text, &mut say).await,
        }
    }

    Ok(())
}
