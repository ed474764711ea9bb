//! Report sessions keyed by conversation identity.
//!
//! The map lock is only held to find, insert or prune a slot. Every read-modify-write of a
//! session runs under that session's own mutex, so conversations never wait on each other.
//! Slots of finished or cancelled reports are pruned, so the map only holds reports in progress.

use crate::machine::{self, Action, Event, SessionState};
use crate::report::Answers;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Opaque conversation identity (e.g. `telegram:12345`).
pub type SessionId = String;

static GENERATION: AtomicU64 = AtomicU64::new(0);

/// Process-wide unique, so a pruned and recreated slot never matches an old summary.
fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::Relaxed) + 1
}

/// Progress of one conversation through the report.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub state: SessionState,
    pub answers: Answers,
    /// Renewed on every begin and cancel; an in-flight summary only lands if it still matches.
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::Inactive,
            answers: Answers::new(),
            generation: 0,
            updated_at: Utc::now(),
        }
    }

    /// Run one event through the state machine and record its effect on the answers.
    pub fn apply(&mut self, event: Event) -> Action {
        let (next, action) = machine::transition(self.state, &event);
        if matches!(action, Action::NoSession | Action::Busy) {
            return action;
        }
        match &action {
            Action::Start | Action::Cancelled => {
                self.answers.clear();
                self.generation = next_generation();
            }
            Action::Ask { answered, .. } | Action::Summarize { answered } => {
                if let Event::Text(text) = event {
                    self.answers.insert(*answered, text);
                }
            }
            Action::NoSession | Action::Busy => {}
        }
        log::debug!("session {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
        self.updated_at = Utc::now();
        action
    }

    /// Finish a summarization started in `generation`. Returns false when the session was
    /// cancelled or restarted meanwhile; the summary must then be dropped.
    pub fn complete(&mut self, generation: u64) -> bool {
        if self.state != SessionState::Summarizing || self.generation != generation {
            return false;
        }
        self.state = SessionState::Inactive;
        self.answers.clear();
        self.updated_at = Utc::now();
        true
    }
}

/// In-memory store for sessions.
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn slot(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.inner.read().await.get(id).cloned()
    }

    async fn slot_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        if let Some(slot) = self.slot(id).await {
            return slot;
        }
        self.inner
            .write()
            .await
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(id.to_string()))))
            .clone()
    }

    /// Return a clone of the session if it exists.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let slot = self.slot(id).await?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    /// Run `f` on the session, creating an inactive one first if needed.
    pub async fn update<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        let slot = self.slot_or_create(id).await;
        let mut session = slot.lock().await;
        f(&mut session)
    }

    /// Run `f` on the session only if it exists.
    pub async fn update_existing<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let slot = self.slot(id).await?;
        let mut session = slot.lock().await;
        Some(f(&mut session))
    }

    /// Drop the slot for `id` if it is inactive and no caller holds it. Returns true if removed.
    pub async fn prune(&self, id: &str) -> bool {
        let mut map = self.inner.write().await;
        let idle = match map.get(id) {
            // Handles are only obtained under the map lock, so a count of one cannot grow here.
            Some(slot) if Arc::strong_count(slot) == 1 => slot
                .try_lock()
                .map(|s| s.state.is_inactive())
                .unwrap_or(false),
            _ => false,
        };
        if idle {
            map.remove(id);
            log::debug!("session {}: slot pruned", id);
        }
        idle
    }

    /// Number of slots currently held.
    pub async fn slot_count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Number of sessions not in the inactive state.
    pub async fn active_count(&self) -> usize {
        let slots: Vec<_> = self.inner.read().await.values().cloned().collect();
        let mut n = 0;
        for slot in slots {
            if !slot.lock().await.state.is_inactive() {
                n += 1;
            }
        }
        n
    }
}
