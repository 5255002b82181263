//! Webhook verification.

use {
    hmac::{Hmac, Mac},
    secrecy::ExposeSecret,
    sha2::Sha256,
    tracing::warn,
};

use crate::config::MessengerAccountConfig;

type HmacSha256 = Hmac<Sha256>;

/// Verify the `X-Hub-Signature-256` header (`sha256=<hex>`) against the body.
pub fn verify_signature(body: &[u8], signature_header: &str, app_secret: &str) -> bool {
    let Some(expected) = signature_header.strip_prefix("sha256=") else {
        warn!("invalid signature header format (missing sha256= prefix)");
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        warn!("failed to create HMAC");
        return false;
    };
    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    constant_time_eq(&computed, &expected.to_ascii_lowercase())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check a POST against the configured app secret. Passes when no secret is
/// configured.
pub fn authenticate(
    body: &[u8],
    signature_header: Option<&str>,
    config: &MessengerAccountConfig,
) -> bool {
    let Some(secret) = config.app_secret.as_ref() else {
        return true;
    };
    match signature_header {
        Some(header) => verify_signature(body, header, secret.expose_secret()),
        None => {
            warn!("webhook request without signature");
            false
        },
    }
}

/// Answer a subscription handshake (`hub.mode=subscribe`).
///
/// Returns the challenge to echo when the verify token matches.
pub fn verify_webhook_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    config: &MessengerAccountConfig,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    if mode == "subscribe" && !config.verify_token.is_empty() && token == config.verify_token {
        Some(challenge.to_string())
    } else {
        None
    }
}
