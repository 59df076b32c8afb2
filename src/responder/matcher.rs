//! First-match-wins keyword matcher.

use std::sync::Arc;

use tracing::debug;

use super::rules::{RuleEntry, RuleTable};

/// Which rule (if any) answered an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    Matched {
        /// Position of the entry in the table.
        index: usize,
        entry: &'a RuleEntry,
        /// The keyword that hit.
        keyword: &'a str,
    },
    Fallback {
        answer: &'a str,
    },
}

impl<'a> MatchOutcome<'a> {
    pub fn answer(&self) -> &'a str {
        match *self {
            Self::Matched { entry, .. } => entry.answer(),
            Self::Fallback { answer } => answer,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Maps an utterance to one canned answer from an immutable [`RuleTable`].
///
/// Matching is plain substring containment against the lower-cased
/// utterance: no trimming, tokenization or word boundaries. Lower-casing is
/// `str::to_lowercase`, which is Unicode-aware but never locale dependent.
///
/// The table is shared behind an `Arc`; clones are cheap and the matcher can
/// be used from any number of sessions at once.
#[derive(Debug, Clone)]
pub struct ResponseMatcher {
    table: Arc<RuleTable>,
}

impl ResponseMatcher {
    pub fn new(table: RuleTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Find the first entry (in table order) with a keyword contained in the
    /// utterance, checking each entry's keywords in order.
    pub fn classify(&self, utterance: &str) -> MatchOutcome<'_> {
        let normalized = utterance.to_lowercase();

        for (index, entry) in self.table.entries().iter().enumerate() {
            if let Some(keyword) = entry
                .keywords()
                .iter()
                .find(|k| normalized.contains(k.as_str()))
            {
                debug!(rule = index, keyword = %keyword, "Utterance matched rule");
                return MatchOutcome::Matched {
                    index,
                    entry,
                    keyword,
                };
            }
        }

        debug!(chars = utterance.chars().count(), "No rule matched, using fallback");
        MatchOutcome::Fallback {
            answer: self.table.fallback(),
        }
    }

    /// Answer an utterance. Always returns a non-empty string.
    pub fn respond(&self, utterance: &str) -> &str {
        self.classify(utterance).answer()
    }
}

impl Default for ResponseMatcher {
    fn default() -> Self {
        Self::new(super::faq::default_table())
    }
}
