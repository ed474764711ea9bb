//! Route inbound channel messages to the report bot and deliver its replies.
//!
//! Messages are handled one at a time in arrival order. Only the summarization of a
//! completed report runs on its own task, so a slow summarizer never holds up other chats.

use crate::bot::{self, Advance, Outcome, ReportBot};
use crate::channels::{ChannelRegistry, Command, InboundMessage, Keyboard, OutboundMessage};
use std::sync::Arc;
use tokio::task::JoinHandle;

async fn deliver(
    registry: &ChannelRegistry,
    channel_id: &str,
    conversation_id: &str,
    message: OutboundMessage,
) {
    let Some(handle) = registry.get(channel_id).await else {
        log::warn!("inbound: no channel registered for {}", channel_id);
        return;
    };
    if let Err(e) = handle.send_message(conversation_id, &message).await {
        log::warn!("inbound: send_message to {} failed: {}", channel_id, e);
    }
}

/// Process one inbound message. Returns the summarization task when the message completed
/// a report; callers may await it (tests) or let it run.
pub async fn process_inbound_message(
    bot: &ReportBot,
    registry: &Arc<ChannelRegistry>,
    msg: InboundMessage,
) -> Option<JoinHandle<()>> {
    let session_id = msg.session_id();
    let reply = match msg.command() {
        Some(Command::Start) => {
            let prompt = bot.begin(&session_id).await;
            Some(OutboundMessage::text(prompt).with_keyboard(Keyboard::Remove))
        }
        Some(Command::Cancel) => {
            let ack = bot.cancel(&session_id).await;
            Some(OutboundMessage::text(ack).with_keyboard(Keyboard::Remove))
        }
        Some(Command::Other(name)) => {
            log::debug!("inbound: ignoring command /{} from {}", name, session_id);
            None
        }
        None => match bot.step(&session_id, &msg.text).await {
            Advance::Reply(Outcome::Prompt(p)) => Some(OutboundMessage::text(p)),
            Advance::Reply(Outcome::Busy) => Some(OutboundMessage::text(bot::PREPARING_SUMMARY)),
            Advance::Reply(Outcome::NoSession) => Some(
                OutboundMessage::text(bot::NO_SESSION_HINT).with_keyboard(Keyboard::StartButton),
            ),
            Advance::Reply(other) => {
                log::warn!("inbound: unexpected outcome {:?} for {}", other, session_id);
                None
            }
            Advance::Summarize(pending) => {
                deliver(
                    registry,
                    &msg.channel_id,
                    &msg.conversation_id,
                    OutboundMessage::text(bot::PREPARING_SUMMARY),
                )
                .await;
                let bot = bot.clone();
                let registry = registry.clone();
                let task = tokio::spawn(async move {
                    if let Outcome::Summary(text) = bot.finish(pending).await {
                        let out = OutboundMessage::text(text).with_keyboard(Keyboard::StartButton);
                        deliver(&registry, &msg.channel_id, &msg.conversation_id, out).await;
                    }
                });
                return Some(task);
            }
        },
    };
    if let Some(out) = reply {
        deliver(registry, &msg.channel_id, &msg.conversation_id, out).await;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelHandle;
    use crate::report::ENABLE_SUMMARY_NOTE;
    use crate::script::{self, Step};
    use crate::summarize::Summarizer;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<(String, OutboundMessage)>>,
    }

    #[async_trait]
    impl ChannelHandle for RecordingChannel {
        fn id(&self) -> &str {
            "test"
        }

        fn stop(&self) {}

        async fn send_message(
            &self,
            conversation_id: &str,
            message: &OutboundMessage,
        ) -> Result<(), String> {
            self.sent
                .lock()
                .await
                .push((conversation_id.to_string(), message.clone()));
            Ok(())
        }
    }

    async fn setup() -> (ReportBot, Arc<ChannelRegistry>, Arc<RecordingChannel>) {
        let registry = Arc::new(ChannelRegistry::new());
        let channel = Arc::new(RecordingChannel::default());
        registry.register("test".to_string(), channel.clone()).await;
        (ReportBot::new(Summarizer::fallback_only()), registry, channel)
    }

    fn msg(conv: &str, text: &str) -> InboundMessage {
        InboundMessage {
            channel_id: "test".to_string(),
            conversation_id: conv.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn full_conversation_over_a_channel() {
        let (bot, registry, channel) = setup().await;
        assert!(process_inbound_message(&bot, &registry, msg("1", "/start")).await.is_none());
        for t in ["1-5 May", "Shipped X", "Closed Y", "Plan Z"] {
            assert!(process_inbound_message(&bot, &registry, msg("1", t)).await.is_none());
        }
        let task = process_inbound_message(&bot, &registry, msg("1", "None"))
            .await
            .expect("summary task");
        task.await.unwrap();

        let sent = channel.sent.lock().await;
        let texts: Vec<&str> = sent.iter().map(|(_, m)| m.text.as_str()).collect();
        assert_eq!(texts[0], script::opening_prompt());
        assert_eq!(texts[1], Step::DoneThisWeek.prompt());
        assert_eq!(texts[4], Step::Blockers.prompt());
        assert_eq!(texts[5], bot::PREPARING_SUMMARY);
        assert!(texts[6].contains("Shipped X") && texts[6].contains(ENABLE_SUMMARY_NOTE));
        assert_eq!(sent[6].1.keyboard, Keyboard::StartButton);
        assert!(sent.iter().all(|(conv, _)| conv == "1"));
    }

    #[tokio::test]
    async fn text_without_session_gets_start_hint() {
        let (bot, registry, channel) = setup().await;
        process_inbound_message(&bot, &registry, msg("9", "hello")).await;
        let sent = channel.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.text, bot::NO_SESSION_HINT);
    }

    #[tokio::test]
    async fn unknown_commands_are_not_answers() {
        let (bot, registry, channel) = setup().await;
        process_inbound_message(&bot, &registry, msg("1", "/start")).await;
        process_inbound_message(&bot, &registry, msg("1", "/help")).await;
        let s = bot.store().get("test:1").await.unwrap();
        assert!(s.answers.is_empty());
        assert_eq!(channel.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn cancel_acknowledges_and_removes_keyboard() {
        let (bot, registry, channel) = setup().await;
        process_inbound_message(&bot, &registry, msg("1", "/start")).await;
        process_inbound_message(&bot, &registry, msg("1", "/cancel")).await;
        let sent = channel.sent.lock().await;
        assert_eq!(sent[1].1.text, bot::CANCEL_ACK);
        assert_eq!(sent[1].1.keyboard, Keyboard::Remove);
    }
}
