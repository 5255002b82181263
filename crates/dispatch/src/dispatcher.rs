//! Pending-command state machine and first-match rule evaluation.

use std::{sync::Arc, time::Instant};

use {
    async_trait::async_trait,
    quandary_channels::ChannelOutbound,
    quandary_common::{Command, InboundEvent},
    quandary_config::CacheScope,
    quandary_nlu::{CachedUnderstander, TrainingSubmitter, Understander},
    quandary_sessions::SessionStore,
    tracing::{debug, info},
};

#[cfg(feature = "metrics")]
use quandary_metrics::{counter, dispatch as dispatch_metrics, histogram, labels};

use crate::{ConversationContext, MatchRule, Result, RuleAction, RuleKind};

/// The handler catalog, keyed by [`Command`].
#[async_trait]
pub trait CommandHandlers: Send + Sync {
    async fn execute(&self, command: Command, ctx: &mut ConversationContext) -> Result<()>;
}

/// What one dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The user's pending command ran.
    Resumed(Command),
    /// The named rule fired.
    Matched { rule: String },
    /// Nothing matched and there was no fallback.
    Unmatched,
}

pub struct Dispatcher {
    store: Arc<SessionStore>,
    nlu: Arc<dyn Understander>,
    shared_cache: Option<Arc<CachedUnderstander>>,
    outbound: Arc<dyn ChannelOutbound>,
    training: TrainingSubmitter,
    handlers: Arc<dyn CommandHandlers>,
    rules: Vec<MatchRule>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<SessionStore>,
        nlu: Arc<dyn Understander>,
        outbound: Arc<dyn ChannelOutbound>,
        handlers: Arc<dyn CommandHandlers>,
    ) -> Self {
        Self {
            store,
            nlu,
            shared_cache: None,
            outbound,
            training: TrainingSubmitter::new(),
            handlers,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cache_scope(mut self, scope: CacheScope) -> Self {
        self.shared_cache = match scope {
            CacheScope::Request => None,
            CacheScope::Process => Some(Arc::new(CachedUnderstander::new(Arc::clone(&self.nlu)))),
        };
        self
    }

    #[must_use]
    pub fn with_training(mut self, training: TrainingSubmitter) -> Self {
        self.training = training;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: Vec<MatchRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn push_rule(&mut self, rule: MatchRule) {
        self.rules.push(rule);
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    fn request_nlu(&self) -> Arc<dyn Understander> {
        match &self.shared_cache {
            Some(cache) => Arc::clone(cache) as Arc<dyn Understander>,
            None => Arc::new(CachedUnderstander::new(Arc::clone(&self.nlu))),
        }
    }

    /// Route one inbound event.
    ///
    /// Holds the sender's session lock for the whole call, so events from the
    /// same user are handled one at a time. The session is saved even when a
    /// handler fails.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<DispatchOutcome> {
        let started = Instant::now();
        #[cfg(feature = "metrics")]
        counter!(
            dispatch_metrics::EVENTS_TOTAL,
            labels::KIND => if event.is_postback() { "postback" } else { "message" }
        )
        .increment(1);

        let user = self.store.find_or_create(&event.sender_id).await?;
        let mut ctx = ConversationContext::new(
            event,
            user,
            self.request_nlu(),
            Arc::clone(&self.outbound),
            self.training.clone(),
        );

        let outcome = self.route(&mut ctx).await;

        let user = ctx.into_user();
        self.store.save(&user).await?;
        drop(user);

        let elapsed = started.elapsed();
        debug!(elapsed_ms = elapsed.as_millis() as u64, ?outcome, "dispatch finished");
        #[cfg(feature = "metrics")]
        {
            histogram!(dispatch_metrics::DURATION_SECONDS).record(elapsed.as_secs_f64());
            if outcome.is_err() {
                counter!(dispatch_metrics::ERRORS_TOTAL).increment(1);
            }
        }
        outcome
    }

    async fn route(&self, ctx: &mut ConversationContext) -> Result<DispatchOutcome> {
        // Taken, not peeked: the handler must set a follow-up explicitly.
        if let Some(command) = ctx.session_mut().take_pending_command() {
            self.execute(command, ctx).await?;
            return Ok(DispatchOutcome::Resumed(command));
        }

        let Some(rule) = self.rules.iter().find(|rule| rule.matches(ctx.event())) else {
            debug!(user_id = %ctx.user_id(), "no rule matched");
            #[cfg(feature = "metrics")]
            counter!(dispatch_metrics::UNMATCHED_TOTAL).increment(1);
            return Ok(DispatchOutcome::Unmatched);
        };
        debug!(user_id = %ctx.user_id(), rule = %rule.name, "rule matched");
        #[cfg(feature = "metrics")]
        counter!(
            dispatch_metrics::RULES_MATCHED_TOTAL,
            labels::RULE => rule.name.clone()
        )
        .increment(1);

        // Whether the pending command is cleared once the action is done.
        let reset = match &rule.action {
            RuleAction::Inline(action) => {
                action(ctx).await?;
                matches!(rule.kind, RuleKind::Fallback)
            },
            RuleAction::Invoke(command) => {
                self.execute(*command, ctx).await?;
                !matches!(rule.kind, RuleKind::Intent)
            },
            RuleAction::StartThread {
                prompt,
                quick_replies,
                resume,
            } => {
                ctx.say_with_replies(prompt, quick_replies).await;
                ctx.next_command(*resume);
                false
            },
        };
        if reset {
            ctx.stop_thread();
        }

        Ok(DispatchOutcome::Matched {
            rule: rule.name.clone(),
        })
    }

    async fn execute(&self, command: Command, ctx: &mut ConversationContext) -> Result<()> {
        let result = self.handlers.execute(command, ctx).await;
        info!(
            user_id = %ctx.user_id(),
            %command,
            ok = result.is_ok(),
            next = ?ctx.pending_command(),
            "command executed"
        );
        #[cfg(feature = "metrics")]
        counter!(
            dispatch_metrics::COMMANDS_EXECUTED_TOTAL,
            labels::COMMAND => command.as_str()
        )
        .increment(1);
        result
    }
}
