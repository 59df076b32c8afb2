//! Configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::error::ConfigError;
use crate::responder::faq;
use crate::responder::{RuleTable, RulesFile};

/// Support desk configuration.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Desk name for identification in logs.
    pub name: String,
    /// First bot turn of every new session.
    pub greeting: String,
    /// JSON rules file replacing the built-in FAQ.
    pub rules_path: Option<PathBuf>,
    /// Whether to read questions from stdin.
    pub cli_enabled: bool,
    /// Whether to serve the web chat channel.
    pub web_enabled: bool,
    pub web_port: u16,
    /// Sessions idle for longer than this are dropped.
    pub session_idle_timeout: Duration,
    /// How often idle sessions are pruned.
    pub prune_interval: Duration,
    /// Directory for a daily rolling log file, in addition to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            name: "garment-assist".to_string(),
            greeting: faq::GREETING.to_string(),
            rules_path: None,
            cli_enabled: true,
            web_enabled: true,
            web_port: 8080,
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            prune_interval: Duration::from_secs(600),        // 10 minutes
            log_dir: None,
        }
    }
}

impl DeskConfig {
    /// Build config from `GARMENT_ASSIST_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let web_port = match lookup("GARMENT_ASSIST_WEB_PORT") {
            Some(raw) => parse_value("GARMENT_ASSIST_WEB_PORT", &raw)?,
            None => defaults.web_port,
        };

        let session_idle_timeout = match lookup("GARMENT_ASSIST_SESSION_IDLE_SECS") {
            Some(raw) => {
                Duration::from_secs(parse_value("GARMENT_ASSIST_SESSION_IDLE_SECS", &raw)?)
            }
            None => defaults.session_idle_timeout,
        };

        let cli_enabled = match lookup("GARMENT_ASSIST_CLI_ENABLED") {
            Some(raw) => parse_flag("GARMENT_ASSIST_CLI_ENABLED", &raw)?,
            None => defaults.cli_enabled,
        };

        let web_enabled = match lookup("GARMENT_ASSIST_WEB_ENABLED") {
            Some(raw) => parse_flag("GARMENT_ASSIST_WEB_ENABLED", &raw)?,
            None => defaults.web_enabled,
        };

        Ok(Self {
            name: lookup("GARMENT_ASSIST_NAME").unwrap_or(defaults.name),
            greeting: lookup("GARMENT_ASSIST_GREETING").unwrap_or(defaults.greeting),
            rules_path: lookup("GARMENT_ASSIST_RULES_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            cli_enabled,
            web_enabled,
            web_port,
            session_idle_timeout,
            prune_interval: defaults.prune_interval,
            log_dir: lookup("GARMENT_ASSIST_LOG_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// The rule table to answer with: the rules file if configured, otherwise
    /// the built-in FAQ.
    pub fn load_rule_table(&self) -> Result<RuleTable, ConfigError> {
        match self.rules_path {
            Some(ref path) => load_rules_file(path),
            None => Ok(faq::default_table()),
        }
    }
}

/// Read and validate a JSON rules file. A missing `fallback` falls back to
/// the built-in one.
pub fn load_rules_file(path: &Path) -> Result<RuleTable, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::RulesFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RulesFile = serde_json::from_str(&raw).map_err(|source| ConfigError::RulesParse {
        path: path.to_path_buf(),
        source,
    })?;
    let table = file
        .into_table(faq::FALLBACK)
        .map_err(|source| ConfigError::RulesInvalid {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), rules = table.len(), "Loaded rules file");
    Ok(table)
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{:?}: {}", raw, e),
    })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{:?} is not a boolean", raw),
        }),
    }
}
