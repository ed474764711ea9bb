//! Weekly report conversation: begin, answer, cancel.
//!
//! `advance` is split into [`ReportBot::step`] and [`ReportBot::finish`] so that callers which
//! must keep handling events (e.g. the gateway) can run the summarization on its own task.
//! No session lock is held while the summarizer runs.

use crate::machine::{Action, Event};
use crate::report::Answers;
use crate::script;
use crate::session::{SessionId, SessionStore};
use crate::summarize::Summarizer;
use std::sync::Arc;

/// Reply to `/cancel`.
pub const CANCEL_ACK: &str = "Raporlamayı iptal ettim. Yeni bir rapor için /start yaz.";

/// Reply to text that arrives with no report in progress.
pub const NO_SESSION_HINT: &str = "Şu an devam eden bir rapor yok. Yeni bir rapor için /start yaz.";

/// Sent once the last answer is in, before the summary is ready.
pub const PREPARING_SUMMARY: &str = "Özet hazırlanıyor, lütfen bekleyin…";

/// Result of feeding one text message to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Next question.
    Prompt(String),
    /// Final output; the session is now inactive.
    Summary(String),
    /// No report in progress for this conversation.
    NoSession,
    /// The report is complete and its summary is still being produced.
    Busy,
    /// The session was cancelled or restarted while its summary was produced.
    Discarded,
}

/// A completed report waiting for its summary.
#[derive(Debug, Clone)]
pub struct PendingSummary {
    pub session_id: SessionId,
    pub answers: Answers,
    generation: u64,
}

/// First half of `advance`.
#[derive(Debug, Clone)]
pub enum Advance {
    Reply(Outcome),
    Summarize(PendingSummary),
}

#[derive(Clone)]
pub struct ReportBot {
    store: Arc<SessionStore>,
    summarizer: Arc<Summarizer>,
}

impl ReportBot {
    pub fn new(summarizer: Summarizer) -> Self {
        Self {
            store: Arc::new(SessionStore::new()),
            summarizer: Arc::new(summarizer),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Start (or restart) a report for `id`; returns the opening prompt.
    pub async fn begin(&self, id: &str) -> String {
        self.store.update(id, |s| s.apply(Event::Begin)).await;
        log::info!("report started for {}", id);
        script::opening_prompt()
    }

    /// End any report for `id` without summarizing; returns the acknowledgement.
    pub async fn cancel(&self, id: &str) -> String {
        let cancelled = self
            .store
            .update_existing(id, |s| {
                let was_active = !s.state.is_inactive();
                s.apply(Event::Cancel);
                was_active
            })
            .await
            .unwrap_or(false);
        if cancelled {
            log::info!("report cancelled for {}", id);
        }
        self.store.prune(id).await;
        CANCEL_ACK.to_string()
    }

    /// Store `text` as the answer to the current question and move on. Does not wait on
    /// the summarizer: a completed report comes back as [`Advance::Summarize`].
    pub async fn step(&self, id: &str, text: &str) -> Advance {
        let event = Event::Text(text.to_string());
        let applied = self
            .store
            .update_existing(id, |s| {
                let action = s.apply(event);
                let pending = matches!(action, Action::Summarize { .. }).then(|| PendingSummary {
                    session_id: s.id.clone(),
                    answers: s.answers.clone(),
                    generation: s.generation,
                });
                (action, pending)
            })
            .await;
        match applied {
            None | Some((Action::NoSession, _)) => Advance::Reply(Outcome::NoSession),
            Some((Action::Busy, _)) => Advance::Reply(Outcome::Busy),
            Some((Action::Ask { next, .. }, _)) => {
                Advance::Reply(Outcome::Prompt(next.prompt().to_string()))
            }
            Some((_, Some(pending))) => Advance::Summarize(pending),
            Some((action, None)) => {
                log::warn!("unexpected action {:?} for text in {}", action, id);
                Advance::Reply(Outcome::NoSession)
            }
        }
    }

    /// Produce the summary for a completed report. Returns `Discarded` if the session moved
    /// on (cancel or begin) while the summarizer was running.
    pub async fn finish(&self, pending: PendingSummary) -> Outcome {
        let text = self.summarizer.summarize(&pending.answers).await;
        let delivered = self
            .store
            .update_existing(&pending.session_id, |s| s.complete(pending.generation))
            .await
            .unwrap_or(false);
        self.store.prune(&pending.session_id).await;
        if delivered {
            log::info!("report completed for {}", pending.session_id);
            Outcome::Summary(text)
        } else {
            log::debug!(
                "dropping summary for {}: session moved on",
                pending.session_id
            );
            Outcome::Discarded
        }
    }

    /// Feed one text message, summarizing inline when it completes the report.
    pub async fn advance(&self, id: &str, text: &str) -> Outcome {
        match self.step(id, text).await {
            Advance::Reply(outcome) => outcome,
            Advance::Summarize(pending) => self.finish(pending).await,
        }
    }
}
