//! Messenger webhook endpoints.

use std::sync::Arc;

use {
    axum::{
        body::Bytes,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
    },
    quandary_messenger::{WebhookPayload, verify_webhook_subscription, webhook::authenticate},
    serde::Deserialize,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use quandary_metrics::{counter, webhook as webhook_metrics};

use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// `GET /webhook`: subscription handshake.
pub async fn verify_subscription_handler(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<SubscriptionQuery>,
) -> impl IntoResponse {
    let Some(config) = state.messenger.as_ref() else {
        return (StatusCode::SERVICE_UNAVAILABLE, String::new());
    };
    match verify_webhook_subscription(
        query.mode.as_deref(),
        query.verify_token.as_deref(),
        query.challenge.as_deref(),
        config,
    ) {
        Some(challenge) => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge)
        },
        None => {
            warn!(mode = ?query.mode, "webhook subscription refused");
            (StatusCode::FORBIDDEN, String::new())
        },
    }
}

/// `POST /webhook`: inbound events.
///
/// Acknowledges as soon as the body is checked. Each event is dispatched on
/// its own task; ordering per user comes from the session lock.
pub async fn receive_events_handler(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    #[cfg(feature = "metrics")]
    counter!(webhook_metrics::REQUESTS_TOTAL).increment(1);

    let Some(config) = state.messenger.as_ref() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };

    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok());
    if !authenticate(&body, signature, config) {
        warn!("webhook signature mismatch");
        #[cfg(feature = "metrics")]
        counter!(webhook_metrics::SIGNATURE_FAILURES_TOTAL).increment(1);
        return StatusCode::FORBIDDEN;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "malformed webhook body");
            return StatusCode::BAD_REQUEST;
        },
    };
    if !payload.is_page() {
        debug!(object = %payload.object, "ignoring non-page webhook");
        return StatusCode::NOT_FOUND;
    }

    for event in payload.into_events() {
        let dispatcher = Arc::clone(&state.dispatcher);
        tokio::spawn(async move {
            let sender_id = event.sender_id.clone();
            if let Err(e) = dispatcher.dispatch(event).await {
                warn!(user_id = %sender_id, error = %e, "dispatch failed");
            }
        });
    }
    StatusCode::OK
}
