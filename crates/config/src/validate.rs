//! Configuration validation.
//!
//! Catches settings that parse fine but leave the bot unable to work, such
//! as a missing NLU token or an empty prompt rotation.

use secrecy::ExposeSecret;

use crate::schema::{QuandaryConfig, SessionBackendKind};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "nlu.token"
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Check a loaded config for settings that would break the bot at runtime.
#[must_use]
pub fn validate(config: &QuandaryConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    let token_missing = config
        .nlu
        .token
        .as_ref()
        .is_none_or(|t| t.expose_secret().trim().is_empty());
    if token_missing {
        result.push(
            Severity::Error,
            "nlu.token",
            "no NLU access token; every message will fail classification",
        );
    }

    if let Some(version) = config.nlu.version.as_deref()
        && (version.len() != 8 || !version.chars().all(|c| c.is_ascii_digit()))
    {
        result.push(
            Severity::Warning,
            "nlu.version",
            format!("'{version}' is not a YYYYMMDD date"),
        );
    }

    if config.flows.unrecognized_prompts.is_empty() {
        result.push(
            Severity::Error,
            "flows.unrecognized_prompts",
            "at least one prompt is required",
        );
    }

    if config.sessions.backend == SessionBackendKind::Sqlite
        && config.sessions.database_url.trim().is_empty()
    {
        result.push(
            Severity::Error,
            "sessions.database_url",
            "sqlite backend selected but no database URL given",
        );
    }

    if config.sessions.backend == SessionBackendKind::Memory {
        result.push(
            Severity::Info,
            "sessions.backend",
            "sessions are kept in memory and lost on restart",
        );
    }

    if config.channels.messenger.is_none() {
        result.push(
            Severity::Warning,
            "channels.messenger",
            "no Messenger account configured; the webhook will reject events",
        );
    }

    result
}
