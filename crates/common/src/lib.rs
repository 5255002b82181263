//! Shared types, error definitions, and utilities used across all quandary crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, FromMessage, Result},
    types::{Command, EventKind, InboundEvent, QuickReply},
};
