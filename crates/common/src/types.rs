use std::fmt;

use serde::{Deserialize, Serialize};

// ── Commands ────────────────────────────────────────────────────────────────

/// Every conversation handler the bot can run.
///
/// A user's pending command is one of these; the handler table matches on it
/// exhaustively, so a persisted name always resolves to real code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Introduce the bot (get-started postback).
    Welcome,
    /// Classify free text and react to it.
    HandleInput,
    /// Resolve the "was that a question?" prompt.
    WasItAQuestion,
    /// Resolve the "want to correct me?" prompt.
    AgreeToCorrect,
    /// Pick what the bot got wrong.
    StartCorrection,
    /// Collect the correct question type.
    CorrectQuestionType,
    /// Collect the correct list of choices.
    CorrectEntities,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::HandleInput => "handle_input",
            Self::WasItAQuestion => "was_it_a_question",
            Self::AgreeToCorrect => "agree_to_correct",
            Self::StartCorrection => "start_correction",
            Self::CorrectQuestionType => "correct_question_type",
            Self::CorrectEntities => "correct_entities",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Quick replies ───────────────────────────────────────────────────────────

/// A suggested-reply chip. Tapping it sends `payload` back instead of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub title: String,
    pub payload: String,
}

impl QuickReply {
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }
}

// ── Inbound events ──────────────────────────────────────────────────────────

/// What the platform delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Message {
        text: Option<String>,
        quick_reply: Option<String>,
    },
    Postback {
        payload: String,
    },
}

/// One inbound event from one sender. Immutable for the whole dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub sender_id: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn text(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            kind: EventKind::Message {
                text: Some(text.into()),
                quick_reply: None,
            },
        }
    }

    /// A tapped quick reply. The platform sends the chip title as text.
    pub fn quick_reply(
        sender_id: impl Into<String>,
        title: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            kind: EventKind::Message {
                text: Some(title.into()),
                quick_reply: Some(payload.into()),
            },
        }
    }

    pub fn postback(sender_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            kind: EventKind::Postback {
                payload: payload.into(),
            },
        }
    }

    /// Message text, if this is a message carrying text.
    pub fn message_text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Message { text, .. } => text.as_deref(),
            EventKind::Postback { .. } => None,
        }
    }

    pub fn quick_reply_payload(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Message { quick_reply, .. } => quick_reply.as_deref(),
            EventKind::Postback { .. } => None,
        }
    }

    pub fn postback_payload(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Postback { payload } => Some(payload),
            EventKind::Message { .. } => None,
        }
    }

    /// The string match rules are evaluated against: message text, or the
    /// postback payload.
    pub fn match_subject(&self) -> Option<&str> {
        self.message_text().or_else(|| self.postback_payload())
    }

    pub fn is_postback(&self) -> bool {
        matches!(self.kind, EventKind::Postback { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_serde_matches_display() {
        let json = serde_json::to_string(&Command::CorrectQuestionType).unwrap();
        assert_eq!(json, "\"correct_question_type\"");
        assert_eq!(Command::CorrectQuestionType.to_string(), "correct_question_type");
    }

    #[test]
    fn postback_has_no_text() {
        let event = InboundEvent::postback("u1", "GET_STARTED");
        assert_eq!(event.message_text(), None);
        assert_eq!(event.quick_reply_payload(), None);
        assert_eq!(event.match_subject(), Some("GET_STARTED"));
        assert!(event.is_postback());
    }

    #[test]
    fn quick_reply_keeps_title_as_text() {
        let event = InboundEvent::quick_reply("u1", "It was a statement", "NOT_A_QUESTION");
        assert_eq!(event.message_text(), Some("It was a statement"));
        assert_eq!(event.quick_reply_payload(), Some("NOT_A_QUESTION"));
    }

    #[test]
    fn event_serializes_flat() {
        let event = InboundEvent::text("u1", "hey");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["sender_id"], "u1");
        assert_eq!(value["kind"], "message");
        assert_eq!(value["text"], "hey");
    }
}
