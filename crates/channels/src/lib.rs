//! Outbound side of a chat channel.
//!
//! Handlers talk to users through [`ChannelOutbound`]; each platform (and the
//! console used by the CLI) implements it.

pub mod console;
pub mod error;
pub mod outbound;

pub use {
    console::ConsoleOutbound,
    error::{Error, Result},
    outbound::{ChannelOutbound, SenderAction},
};
