//! Error types for the support desk.
//!
//! The responder itself is total and never returns an error; these cover
//! rule-table construction, configuration and channel I/O around it.

use std::path::PathBuf;

/// Top-level error type for the desk loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read rules file {path}: {source}")]
    RulesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rules file {path}: {source}")]
    RulesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Rules file {path} is invalid: {source}")]
    RulesInvalid {
        path: PathBuf,
        #[source]
        source: RuleError,
    },
}

/// Rule-table construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Rule table has no entries")]
    EmptyTable,

    #[error("Rule {index} has no keywords")]
    NoKeywords { index: usize },

    #[error("Rule {index} has an empty keyword at position {position}")]
    EmptyKeyword { index: usize, position: usize },

    #[error("Rule {index} has an empty answer")]
    EmptyAnswer { index: usize },

    #[error("Fallback answer is empty")]
    EmptyFallback,
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Channel {name} not registered")]
    NotRegistered { name: String },

    #[error("Channel health check failed: {name}")]
    HealthCheckFailed { name: String },
}
