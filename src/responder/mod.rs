//! Keyword responder for customer-support questions.
//!
//! A [`ResponseMatcher`] owns an immutable, ordered [`RuleTable`] and maps a
//! single utterance to exactly one canned answer:
//! 1. The utterance is lower-cased (ordinal, locale independent).
//! 2. Entries are tried in table order, keywords in entry order.
//! 3. The first keyword found as a substring selects that entry's answer.
//! 4. Nothing found → the table's fallback answer.
//!
//! There is no scoring and no error path; every input gets an answer.

pub mod faq;
pub mod matcher;
pub mod rules;

pub use matcher::{MatchOutcome, ResponseMatcher};
pub use rules::{RuleEntry, RuleSpec, RuleTable, RuleTableBuilder, RulesFile};
