//! Conversation state machine.
//!
//! `transition` is a pure, total function from (state, event) to (new state, action).
//! Answer bookkeeping lives on the session; this module only decides where to go.

use crate::script::Step;
use serde::Serialize;

/// Position of a conversation in the prompt script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum SessionState {
    /// No report in progress.
    #[default]
    Inactive,
    /// Waiting for the answer to this step.
    Awaiting(Step),
    /// All answers collected; the summary is being produced.
    Summarizing,
}

impl SessionState {
    pub fn is_inactive(&self) -> bool {
        matches!(self, SessionState::Inactive)
    }
}

/// Inbound event for one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Begin,
    Text(String),
    Cancel,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Store nothing; send the opening prompt.
    Start,
    /// Store the text under `answered`, then send the prompt of `next`.
    Ask { answered: Step, next: Step },
    /// Store the text under `answered`; the report is complete and must be summarized.
    Summarize { answered: Step },
    /// Session ended by the user.
    Cancelled,
    /// Text with no report in progress.
    NoSession,
    /// Text while the summary is being produced.
    Busy,
}

pub fn transition(state: SessionState, event: &Event) -> (SessionState, Action) {
    match (state, event) {
        (_, Event::Begin) => (SessionState::Awaiting(Step::first()), Action::Start),
        (_, Event::Cancel) => (SessionState::Inactive, Action::Cancelled),
        (SessionState::Inactive, Event::Text(_)) => (SessionState::Inactive, Action::NoSession),
        (SessionState::Summarizing, Event::Text(_)) => (SessionState::Summarizing, Action::Busy),
        (SessionState::Awaiting(step), Event::Text(_)) => match step.next() {
            Some(next) => (
                SessionState::Awaiting(next),
                Action::Ask {
                    answered: step,
                    next,
                },
            ),
            None => (
                SessionState::Summarizing,
                Action::Summarize { answered: step },
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> Event {
        Event::Text("x".to_string())
    }

    #[test]
    fn begin_always_goes_to_first_step() {
        for state in [
            SessionState::Inactive,
            SessionState::Awaiting(Step::NextWeekPlan),
            SessionState::Summarizing,
        ] {
            assert_eq!(
                transition(state, &Event::Begin),
                (SessionState::Awaiting(Step::DateRange), Action::Start)
            );
        }
    }

    #[test]
    fn cancel_always_goes_inactive() {
        for state in [
            SessionState::Inactive,
            SessionState::Awaiting(Step::Blockers),
            SessionState::Summarizing,
        ] {
            assert_eq!(
                transition(state, &Event::Cancel),
                (SessionState::Inactive, Action::Cancelled)
            );
        }
    }

    #[test]
    fn text_advances_one_step_at_a_time() {
        let mut state = transition(SessionState::Inactive, &Event::Begin).0;
        let mut answered = Vec::new();
        loop {
            let (next, action) = transition(state, &text());
            state = next;
            match action {
                Action::Ask { answered: a, next } => {
                    answered.push(a);
                    assert_eq!(state, SessionState::Awaiting(next));
                }
                Action::Summarize { answered: a } => {
                    answered.push(a);
                    break;
                }
                other => panic!("unexpected action {:?}", other),
            }
        }
        assert_eq!(answered, Step::ALL.to_vec());
        assert_eq!(state, SessionState::Summarizing);
    }

    #[test]
    fn text_without_session_or_while_summarizing_does_not_move() {
        assert_eq!(
            transition(SessionState::Inactive, &text()),
            (SessionState::Inactive, Action::NoSession)
        );
        assert_eq!(
            transition(SessionState::Summarizing, &text()),
            (SessionState::Summarizing, Action::Busy)
        );
    }
}
