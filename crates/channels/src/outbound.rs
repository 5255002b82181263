use {
    async_trait::async_trait,
    quandary_common::QuickReply,
    serde::{Deserialize, Serialize},
};

use crate::Result;

/// Presence signals a bot can show in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    MarkSeen,
    TypingOn,
    TypingOff,
}

impl SenderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarkSeen => "mark_seen",
            Self::TypingOn => "typing_on",
            Self::TypingOff => "typing_off",
        }
    }
}

/// Send messages to a user. Delivery is at most once.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Send text, optionally offering quick-reply chips.
    async fn send_text(&self, to: &str, text: &str, quick_replies: &[QuickReply]) -> Result<()>;

    /// Show a presence signal. No-op by default.
    async fn send_action(&self, _to: &str, _action: SenderAction) -> Result<()> {
        Ok(())
    }

    async fn mark_seen(&self, to: &str) -> Result<()> {
        self.send_action(to, SenderAction::MarkSeen).await
    }

    async fn typing_on(&self, to: &str) -> Result<()> {
        self.send_action(to, SenderAction::TypingOn).await
    }

    async fn typing_off(&self, to: &str) -> Result<()> {
        self.send_action(to, SenderAction::TypingOff).await
    }
}
