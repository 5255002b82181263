use std::{collections::BTreeMap, fmt};

use {
    quandary_common::Command,
    serde::{Deserialize, Serialize},
};

/// The fixed vocabulary of per-user scratch values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKey {
    /// Utterance a later correction would apply to.
    NeedsCorrection,
    /// The bot's most recent answer.
    LastAnswer,
    /// Consecutive unrecognized questions.
    FailureCount,
    /// Intent label collected during a correction.
    CorrectTrait,
}

impl SessionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsCorrection => "needs_correction",
            Self::LastAnswer => "last_answer",
            Self::FailureCount => "failure_count",
            Self::CorrectTrait => "correct_trait",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionValue {
    Number(i64),
    Text(String),
}

impl From<i64> for SessionValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for SessionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SessionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Mutable per-user state carried between messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    values: BTreeMap<SessionKey, SessionValue>,
    /// The handler that receives this user's next event. At most one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending_command: Option<Command>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SessionKey) -> Option<&SessionValue> {
        self.values.get(&key)
    }

    pub fn text(&self, key: SessionKey) -> Option<&str> {
        match self.values.get(&key)? {
            SessionValue::Text(s) => Some(s),
            SessionValue::Number(_) => None,
        }
    }

    pub fn number(&self, key: SessionKey) -> Option<i64> {
        match self.values.get(&key)? {
            SessionValue::Number(n) => Some(*n),
            SessionValue::Text(s) => s.parse().ok(),
        }
    }

    pub fn set(&mut self, key: SessionKey, value: impl Into<SessionValue>) {
        self.values.insert(key, value.into());
    }

    pub fn remove(&mut self, key: SessionKey) -> Option<SessionValue> {
        self.values.remove(&key)
    }

    pub fn values(&self) -> impl Iterator<Item = (SessionKey, &SessionValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn pending_command(&self) -> Option<Command> {
        self.pending_command
    }

    /// Replace the pending command. Any previous one is dropped.
    pub fn set_pending_command(&mut self, command: Command) {
        self.pending_command = Some(command);
    }

    pub fn clear_pending_command(&mut self) {
        self.pending_command = None;
    }

    pub fn take_pending_command(&mut self) -> Option<Command> {
        self.pending_command.take()
    }

    // ── Typed accessors ─────────────────────────────────────────────────────

    pub fn needs_correction(&self) -> Option<&str> {
        self.text(SessionKey::NeedsCorrection)
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.text(SessionKey::LastAnswer)
    }

    pub fn failure_count(&self) -> i64 {
        self.number(SessionKey::FailureCount).unwrap_or(0)
    }

    /// Bump the consecutive-failure counter and return the new value.
    pub fn increment_failures(&mut self) -> i64 {
        let next = self.failure_count().saturating_add(1);
        self.set(SessionKey::FailureCount, next);
        next
    }

    pub fn reset_failures(&mut self) {
        self.set(SessionKey::FailureCount, 0);
    }

    pub fn correct_trait(&self) -> Option<&str> {
        self.text(SessionKey::CorrectTrait)
    }
}

/// A platform user and their session. Created on first contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub session: Session,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_session(id, Session::new())
    }

    pub fn with_session(id: impl Into<String>, session: Session) -> Self {
        Self {
            id: id.into(),
            session,
        }
    }
}
