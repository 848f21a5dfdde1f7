// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verdict filter for the history list.

use allerscan_core::analysis::{HistoryEntry, Verdict};

/// Which past analyses the history page lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Safe,
    /// Unsafe and risky verdicts alike.
    Unsafe,
}

impl HistoryFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Safe, Self::Unsafe];

    pub fn matches(self, entry: &HistoryEntry) -> bool {
        match self {
            Self::All => true,
            Self::Safe => entry.result.verdict == Verdict::Safe,
            Self::Unsafe => matches!(entry.result.verdict, Verdict::Unsafe | Verdict::Risky),
        }
    }

    /// Entries passing the filter, in their original order.
    pub fn apply<'a>(self, entries: &'a [HistoryEntry]) -> Vec<&'a HistoryEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Safe => "Safe",
            Self::Unsafe => "Unsafe",
        }
    }

    /// Heading and body shown when nothing passes the filter.
    /// `history_empty` is whether there is any history at all.
    pub fn empty_message(self, history_empty: bool) -> (&'static str, &'static str) {
        if history_empty {
            return ("No History Yet", "Start analyzing dishes to see them here");
        }
        match self {
            Self::Safe => (
                "No Safe Dishes",
                "You don't have any safe dishes in your history",
            ),
            Self::All | Self::Unsafe => (
                "No Unsafe Dishes",
                "You don't have any unsafe dishes in your history",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_core::analysis::AnalysisResult;

    fn entry(id: &str, verdict: Verdict) -> HistoryEntry {
        HistoryEntry {
            id: id.into(),
            timestamp: "2026-03-01T12:00:00Z".into(),
            result: AnalysisResult {
                dish_name: format!("dish {id}"),
                verdict,
                confidence: 80,
                detected_allergens: vec![],
                risky_ingredients: vec![],
                substitutions: vec![],
                alternative_dishes: vec![],
                explanation: String::new(),
                nutrition: None,
                image_url: None,
            },
        }
    }

    fn ids(entries: Vec<&HistoryEntry>) -> Vec<&str> {
        entries.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn unsafe_filter_includes_risky() {
        let history = vec![
            entry("a", Verdict::Safe),
            entry("b", Verdict::Risky),
            entry("c", Verdict::Unsafe),
        ];
        assert_eq!(ids(HistoryFilter::Unsafe.apply(&history)), vec!["b", "c"]);
        assert_eq!(ids(HistoryFilter::Safe.apply(&history)), vec!["a"]);
        assert_eq!(ids(HistoryFilter::All.apply(&history)), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_text_depends_on_history_and_filter() {
        assert_eq!(HistoryFilter::Safe.empty_message(true).0, "No History Yet");
        assert_eq!(HistoryFilter::Safe.empty_message(false).0, "No Safe Dishes");
        assert_eq!(
            HistoryFilter::Unsafe.empty_message(false).1,
            "You don't have any unsafe dishes in your history"
        );
    }

    #[test]
    fn default_shows_everything() {
        assert_eq!(HistoryFilter::default(), HistoryFilter::All);
        assert_eq!(HistoryFilter::ALL.map(HistoryFilter::label), ["All", "Safe", "Unsafe"]);
    }
}
