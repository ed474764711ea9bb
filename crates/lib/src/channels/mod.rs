//! Communication channels (e.g. Telegram).
//!
//! Channel trait and registry so the gateway can start/stop channel connectors
//! and deliver replies. Inbound messages are sent to the gateway's dispatcher.

mod inbound;
mod registry;
mod telegram;

pub use inbound::{parse_command, Command, InboundMessage, Keyboard, OutboundMessage};
pub use registry::{ChannelHandle, ChannelRegistry};
pub use telegram::{TelegramChannel, TelegramUpdate};
