//! Inbound and outbound channel messages, and bot command parsing.

/// A message from a channel to be routed to the report conversation of its chat.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: String,
    pub conversation_id: String,
    pub text: String,
}

impl InboundMessage {
    /// Session id for this message's conversation (`<channel>:<conversation>`).
    pub fn session_id(&self) -> String {
        format!("{}:{}", self.channel_id, self.conversation_id)
    }

    pub fn command(&self) -> Option<Command> {
        parse_command(&self.text)
    }
}

/// Bot command carried by a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    /// Any other `/command`; not an answer, ignored by the conversation.
    Other(String),
}

/// Parse a leading `/command`. `@botname` suffixes and arguments are ignored; matching is
/// case-insensitive. Returns None for plain text.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or("").to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some(match name.as_str() {
        "start" => Command::Start,
        "cancel" => Command::Cancel,
        _ => Command::Other(name),
    })
}

/// Reply keyboard change to send along with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Keyboard {
    /// Leave whatever keyboard the client shows.
    #[default]
    Keep,
    /// Offer a single `/start` button.
    StartButton,
    /// Hide the custom keyboard.
    Remove,
}

/// A text reply to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: Keyboard,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Keep,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}
