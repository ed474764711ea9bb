//! Gateway: HTTP server for health and Telegram webhook, and the inbound dispatcher
//! that feeds channel messages to the report bot.

mod dispatch;
mod server;

pub use dispatch::process_inbound_message;
pub use server::{run_gateway, run_gateway_with, GatewayState};
