//! Weekly report bot core library — prompt script, sessions, state machine, summarization,
//! channels and gateway, used by the CLI.

pub mod bot;
pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod machine;
pub mod report;
pub mod script;
pub mod session;
pub mod summarize;
