//! Match rules evaluated for events with no pending command.

use std::{fmt, sync::Arc};

use {
    futures::future::{BoxFuture, FutureExt},
    quandary_common::{Command, InboundEvent, QuickReply},
    regex::{Regex, RegexBuilder},
};

use crate::{ConversationContext, Error, Result};

/// Behaviour run in place, without a named handler.
pub type InlineAction =
    Arc<dyn for<'a> Fn(&'a mut ConversationContext) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Wrap a closure as an [`InlineAction`].
///
/// ```ignore
/// inline(|ctx| async move { ctx.say("ok").await; Ok(()) }.boxed())
/// ```
pub fn inline<F>(f: F) -> InlineAction
where
    F: for<'a> Fn(&'a mut ConversationContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// An inline action that replies with fixed text.
pub fn say(text: impl Into<String>) -> InlineAction {
    let text: Arc<str> = Arc::from(text.into());
    inline(move |ctx| {
        let text = Arc::clone(&text);
        async move {
            ctx.say(&text).await;
            Ok(())
        }
        .boxed()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// At least one pattern matches.
    Any,
    /// Every pattern matches.
    All,
}

pub enum RuleKind {
    /// Case-insensitive patterns anchored at the start of the text (or the
    /// postback payload).
    Pattern { patterns: Vec<Regex>, mode: MatchMode },
    /// Any message (not a postback). Hands it to the NLU-backed handler.
    Intent,
    /// Anything at all. Put it last.
    Fallback,
}

pub enum RuleAction {
    /// Run in place. Only a fallback clears the pending command afterwards,
    /// so a pattern rule's inline action may start a thread of its own.
    Inline(InlineAction),
    /// Run a handler, then clear the pending command. Intent rules leave it
    /// to the handler.
    Invoke(Command),
    /// Send `prompt` and resume with `resume` on the user's next event.
    StartThread {
        prompt: String,
        quick_replies: Vec<QuickReply>,
        resume: Command,
    },
}

impl fmt::Debug for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline"),
            Self::Invoke(command) => f.debug_tuple("Invoke").field(command).finish(),
            Self::StartThread { resume, .. } => f
                .debug_struct("StartThread")
                .field("resume", resume)
                .finish_non_exhaustive(),
        }
    }
}

/// One row of the routing table.
pub struct MatchRule {
    pub name: String,
    pub kind: RuleKind,
    pub action: RuleAction,
}

impl MatchRule {
    /// A pattern rule. Patterns are regular expressions matched
    /// case-insensitively from the start of the text.
    pub fn pattern(patterns: &[&str], mode: MatchMode, action: RuleAction) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(&format!("^(?:{p})"))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| Error::pattern(*p, e))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: patterns.join("|"),
            kind: RuleKind::Pattern {
                patterns: compiled,
                mode,
            },
            action,
        })
    }

    /// Route free text to the NLU-backed `command`.
    pub fn intent(command: Command) -> Self {
        Self {
            name: format!("intent:{command}"),
            kind: RuleKind::Intent,
            action: RuleAction::Invoke(command),
        }
    }

    pub fn fallback(action: RuleAction) -> Self {
        Self {
            name: "fallback".into(),
            kind: RuleKind::Fallback,
            action,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn matches(&self, event: &InboundEvent) -> bool {
        match &self.kind {
            RuleKind::Pattern { patterns, mode } => {
                let Some(subject) = event.match_subject() else {
                    return false;
                };
                match mode {
                    MatchMode::Any => patterns.iter().any(|re| re.is_match(subject)),
                    MatchMode::All => patterns.iter().all(|re| re.is_match(subject)),
                }
            },
            RuleKind::Intent => !event.is_postback(),
            RuleKind::Fallback => true,
        }
    }
}
