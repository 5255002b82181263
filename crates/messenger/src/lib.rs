//! Facebook Messenger channel: webhook verification and parsing, and the
//! Send API outbound.

pub mod config;
pub mod outbound;
pub mod types;
pub mod webhook;

pub use {
    config::MessengerAccountConfig,
    outbound::MessengerOutbound,
    types::WebhookPayload,
    webhook::{verify_signature, verify_webhook_subscription},
};
