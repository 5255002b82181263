//! Inbound event routing.
//!
//! For each event the [`Dispatcher`] either resumes the user's pending
//! command or walks an ordered table of [`MatchRule`]s, running the first one
//! that matches. Handlers see the conversation through a
//! [`ConversationContext`].

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod rules;

pub use {
    context::ConversationContext,
    dispatcher::{CommandHandlers, DispatchOutcome, Dispatcher},
    error::{Error, Result},
    rules::{InlineAction, MatchMode, MatchRule, RuleAction, RuleKind, inline, say},
};
