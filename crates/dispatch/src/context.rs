//! What a handler can see and do during one dispatch.

use std::sync::Arc;

use {
    quandary_channels::ChannelOutbound,
    quandary_common::{Command, InboundEvent, QuickReply},
    quandary_nlu::{EntitySet, TrainingSample, TrainingSubmitter, Understander},
    quandary_sessions::{Session, User, UserGuard},
    tokio::task::JoinHandle,
    tracing::warn,
};

#[cfg(feature = "metrics")]
use quandary_metrics::{counter, dispatch as dispatch_metrics};

/// The capability object handed to every handler.
///
/// Owns the event and an exclusive lock on the sending user for the whole
/// dispatch. Outbound failures are logged and swallowed; delivery is best
/// effort.
pub struct ConversationContext {
    event: InboundEvent,
    user: UserGuard,
    nlu: Arc<dyn Understander>,
    outbound: Arc<dyn ChannelOutbound>,
    training: TrainingSubmitter,
}

impl ConversationContext {
    pub fn new(
        event: InboundEvent,
        user: UserGuard,
        nlu: Arc<dyn Understander>,
        outbound: Arc<dyn ChannelOutbound>,
        training: TrainingSubmitter,
    ) -> Self {
        Self {
            event,
            user,
            nlu,
            outbound,
            training,
        }
    }

    pub fn event(&self) -> &InboundEvent {
        &self.event
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Message text of the current event.
    pub fn text(&self) -> Option<&str> {
        self.event.message_text()
    }

    /// Payload of the tapped quick reply, if any.
    pub fn quick_reply(&self) -> Option<&str> {
        self.event.quick_reply_payload()
    }

    pub fn session(&self) -> &Session {
        &self.user.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.user.session
    }

    // ── Threads ─────────────────────────────────────────────────────────────

    /// Route this user's next event to `command`.
    pub fn next_command(&mut self, command: Command) {
        self.user.session.set_pending_command(command);
    }

    /// End the current dialog branch.
    pub fn stop_thread(&mut self) {
        self.user.session.clear_pending_command();
    }

    pub fn pending_command(&self) -> Option<Command> {
        self.user.session.pending_command()
    }

    // ── Outbound ────────────────────────────────────────────────────────────

    pub async fn say(&self, text: &str) {
        self.say_with_replies(text, &[]).await;
    }

    pub async fn say_with_replies(&self, text: &str, quick_replies: &[QuickReply]) {
        if let Err(e) = self
            .outbound
            .send_text(&self.user.id, text, quick_replies)
            .await
        {
            warn!(user_id = %self.user.id, error = %e, "failed to send reply");
            #[cfg(feature = "metrics")]
            counter!(dispatch_metrics::SEND_ERRORS_TOTAL).increment(1);
        }
    }

    pub async fn mark_seen(&self) {
        if let Err(e) = self.outbound.mark_seen(&self.user.id).await {
            warn!(user_id = %self.user.id, error = %e, "failed to mark seen");
        }
    }

    pub async fn typing(&self, on: bool) {
        let result = if on {
            self.outbound.typing_on(&self.user.id).await
        } else {
            self.outbound.typing_off(&self.user.id).await
        };
        if let Err(e) = result {
            warn!(user_id = %self.user.id, on, error = %e, "failed to toggle typing");
        }
    }

    // ── NLU ─────────────────────────────────────────────────────────────────

    /// Classify the current message text. Events without text classify as
    /// empty.
    pub async fn classify(&self) -> quandary_nlu::Result<EntitySet> {
        match self.text() {
            Some(text) => self.nlu.classify(text).await,
            None => Ok(EntitySet::new()),
        }
    }

    /// Values of `entity` in the current message text.
    pub async fn entity_values(&self, entity: &str) -> quandary_nlu::Result<Vec<String>> {
        match self.text() {
            Some(text) => self.nlu.entity_values(text, entity).await,
            None => Ok(Vec::new()),
        }
    }

    /// Submit a correction in the background. The conversation never waits
    /// on it.
    pub fn train(&self, sample: TrainingSample) -> JoinHandle<()> {
        self.training.submit(Arc::clone(&self.nlu), sample)
    }

    /// Release the user lock, handing the record back for persistence.
    pub fn into_user(self) -> UserGuard {
        self.user
    }
}
