//! Prompt script: the fixed, ordered questions of the weekly report.
//!
//! Each step names the answer field it fills, the question sent to the user and the
//! label used when the answers are rendered without a summarizer.

use serde::Serialize;

/// Introduction sent together with the first question when a report starts.
pub const GREETING: &str =
    "Merhaba! Haftalık rapor için birkaç soru soracağım. İstediğinde /cancel yazabilirsin.";

/// One question of the report. Declaration order is script order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    DateRange,
    DoneThisWeek,
    CompletedItems,
    NextWeekPlan,
    Blockers,
}

impl Step {
    /// All steps in the order they are asked.
    pub const ALL: [Step; 5] = [
        Step::DateRange,
        Step::DoneThisWeek,
        Step::CompletedItems,
        Step::NextWeekPlan,
        Step::Blockers,
    ];

    pub fn first() -> Step {
        Step::ALL[0]
    }

    /// Step after this one; `None` when the answer to this step completes the report.
    pub fn next(self) -> Option<Step> {
        match self {
            Step::DateRange => Some(Step::DoneThisWeek),
            Step::DoneThisWeek => Some(Step::CompletedItems),
            Step::CompletedItems => Some(Step::NextWeekPlan),
            Step::NextWeekPlan => Some(Step::Blockers),
            Step::Blockers => None,
        }
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    /// Field name the answer is stored under.
    pub fn field(self) -> &'static str {
        match self {
            Step::DateRange => "date_range",
            Step::DoneThisWeek => "done_this_week",
            Step::CompletedItems => "completed_items",
            Step::NextWeekPlan => "next_week_plan",
            Step::Blockers => "blockers",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Step::DateRange => "Lütfen tarih aralığını gir (ör. 1-5 Mayıs 2024).",
            Step::DoneThisWeek => "Bu hafta neler yapıldı?",
            Step::CompletedItems => "Tamamlanan işler neler?",
            Step::NextWeekPlan => "Gelecek hafta neler yapacaksın?",
            Step::Blockers => "Riskler veya engeller var mı?",
        }
    }

    /// Human-readable label for the fallback rendering.
    pub fn label(self) -> &'static str {
        match self {
            Step::DateRange => "📅 Tarih",
            Step::DoneThisWeek => "✅ Bu hafta",
            Step::CompletedItems => "🎯 Tamamlananlar",
            Step::NextWeekPlan => "🔜 Haftaya",
            Step::Blockers => "⚠️ Riskler",
        }
    }
}

/// Text sent when a report starts: greeting plus the first question.
pub fn opening_prompt() -> String {
    format!("{}\n{}", GREETING, Step::first().prompt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_all_steps_in_order() {
        let mut walked = vec![Step::first()];
        while let Some(n) = walked.last().and_then(|s| s.next()) {
            walked.push(n);
        }
        assert_eq!(walked, Step::ALL.to_vec());
        assert!(Step::Blockers.is_last());
    }

    #[test]
    fn declaration_order_matches_script_order() {
        let mut sorted = Step::ALL;
        sorted.sort();
        assert_eq!(sorted, Step::ALL);
    }

    #[test]
    fn field_names_are_distinct() {
        let mut fields: Vec<&str> = Step::ALL.iter().map(|s| s.field()).collect();
        fields.sort();
        fields.dedup();
        assert_eq!(fields.len(), Step::ALL.len());
    }

    #[test]
    fn opening_prompt_mentions_cancel_and_first_question() {
        let p = opening_prompt();
        assert!(p.contains("/cancel"));
        assert!(p.ends_with(Step::DateRange.prompt()));
    }
}
