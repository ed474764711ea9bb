//! Collected report answers and their two text renderings: the request sent to the
//! summarizer and the plain listing used when no summarizer is configured.

use crate::script::Step;
use serde::Serialize;
use std::collections::BTreeMap;

/// Note appended to the plain listing telling the operator how to enable summaries.
pub const ENABLE_SUMMARY_NOTE: &str = "(Özet için GOOGLE_API_KEY tanımlayın.)";

/// Answers collected so far, keyed by step. Iteration follows script order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Answers {
    #[serde(flatten)]
    by_step: BTreeMap<Step, String>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, step: Step, text: impl Into<String>) {
        self.by_step.insert(step, text.into());
    }

    pub fn get(&self, step: Step) -> Option<&str> {
        self.by_step.get(&step).map(String::as_str)
    }

    /// Answer for `step`, or the empty string when it was not collected.
    pub fn value(&self, step: Step) -> &str {
        self.get(step).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.by_step.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_step.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_step.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, &str)> {
        self.by_step.iter().map(|(s, v)| (*s, v.as_str()))
    }

    /// Field names present, in script order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.by_step.keys().map(|s| s.field()).collect()
    }
}

impl FromIterator<(Step, String)> for Answers {
    fn from_iter<I: IntoIterator<Item = (Step, String)>>(iter: I) -> Self {
        Self {
            by_step: iter.into_iter().collect(),
        }
    }
}

fn request_heading(step: Step) -> &'static str {
    match step {
        Step::DateRange => "Tarih aralığı:",
        Step::DoneThisWeek => "Bu hafta yapılanlar:",
        Step::CompletedItems => "Tamamlanan işler:",
        Step::NextWeekPlan => "Haftaya planlananlar:",
        Step::Blockers => "Riskler/engeller:",
    }
}

/// Render the summarization request. Every step gets its own heading followed by the
/// answer verbatim on the next line(s), so multi-line answers stay inside their block.
pub fn build_request(answers: &Answers) -> String {
    let mut out = String::from(
        "Sen bir takımın haftalık rapor yardımcısısın. \
         Aşağıdaki bilgileri haftalık bir durum raporuna dönüştür.\n\n",
    );
    for step in Step::ALL {
        out.push_str(request_heading(step));
        out.push('\n');
        out.push_str(answers.value(step));
        out.push_str("\n\n");
    }
    out.push_str(
        "Beklenen çıktı:\n\
         - 4-6 maddelik kısa bir özet\n\
         - Net aksiyonlar ve sahipleri\n\
         - Kritik riskler için kısa öneri\n\
         - Türkçe, anlaşılır ve Telegram için biçimlendirilmiş",
    );
    out
}

/// Plain listing of the answers with labels, used when summarization is not configured.
pub fn render_fallback(answers: &Answers) -> String {
    let mut lines: Vec<String> = Step::ALL
        .iter()
        .map(|s| format!("{}: {}", s.label(), answers.value(*s)))
        .collect();
    lines.push(String::new());
    lines.push(ENABLE_SUMMARY_NOTE.to_string());
    lines.join("\n")
}
