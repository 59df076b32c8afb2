//! Rule entries and the ordered rule table.

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// A validated (keywords, answer) pair.
///
/// Keywords are stored lower-cased and in their original order. Entries are
/// only built through [`RuleTableBuilder`], so every entry in a table has at
/// least one non-empty keyword and a non-empty answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEntry {
    keywords: Vec<String>,
    answer: String,
}

impl RuleEntry {
    fn validated(index: usize, keywords: Vec<String>, answer: String) -> Result<Self, RuleError> {
        if keywords.is_empty() {
            return Err(RuleError::NoKeywords { index });
        }
        if let Some(position) = keywords.iter().position(|k| k.is_empty()) {
            return Err(RuleError::EmptyKeyword { index, position });
        }
        if answer.trim().is_empty() {
            return Err(RuleError::EmptyAnswer { index });
        }

        Ok(Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            answer,
        })
    }

    /// Lower-cased keywords in match order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Ordered rule table plus its fallback answer.
///
/// Order is priority: when an utterance hits keywords from several entries,
/// the earliest entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
    fallback: String,
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects raw rules in order and validates them in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct RuleTableBuilder {
    rules: Vec<RuleSpec>,
    fallback: Option<String>,
}

impl RuleTableBuilder {
    /// Append a rule. Position in the builder is its priority.
    pub fn rule<K, S>(mut self, keywords: K, answer: impl Into<String>) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(RuleSpec {
            keywords: keywords.into_iter().map(Into::into).collect(),
            answer: answer.into(),
        });
        self
    }

    pub fn spec(mut self, spec: RuleSpec) -> Self {
        self.rules.push(spec);
        self
    }

    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn build(self) -> Result<RuleTable, RuleError> {
        if self.rules.is_empty() {
            return Err(RuleError::EmptyTable);
        }

        let fallback = self.fallback.unwrap_or_default();
        if fallback.trim().is_empty() {
            return Err(RuleError::EmptyFallback);
        }

        let entries = self
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, spec)| RuleEntry::validated(index, spec.keywords, spec.answer))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuleTable { entries, fallback })
    }
}

/// Unvalidated rule as written in a rules file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub keywords: Vec<String>,
    pub answer: String,
}

/// On-disk rules document.
///
/// ```json
/// { "fallback": "Sorry...", "rules": [{ "keywords": ["price"], "answer": "..." }] }
/// ```
///
/// `fallback` may be omitted, in which case the caller's default is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub fallback: Option<String>,
    pub rules: Vec<RuleSpec>,
}

impl RulesFile {
    pub fn into_table(self, default_fallback: &str) -> Result<RuleTable, RuleError> {
        let fallback = self
            .fallback
            .unwrap_or_else(|| default_fallback.to_string());

        self.rules
            .into_iter()
            .fold(RuleTable::builder(), RuleTableBuilder::spec)
            .fallback(fallback)
            .build()
    }
}
