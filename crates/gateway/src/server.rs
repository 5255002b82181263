use std::{net::SocketAddr, sync::Arc};

use {
    anyhow::Context,
    axum::{
        Router,
        extract::State,
        response::{IntoResponse, Json},
        routing::get,
    },
    tower_http::trace::TraceLayer,
    tracing::info,
};

use crate::{
    state::GatewayState,
    webhook_routes::{receive_events_handler, verify_subscription_handler},
};

/// Build the router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/webhook",
            get(verify_subscription_handler).post(receive_events_handler),
        );

    #[cfg(feature = "prometheus")]
    let router = router.route(
        "/metrics",
        get(crate::metrics_routes::prometheus_metrics_handler),
    );

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn start_gateway(state: Arc<GatewayState>, bind: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {bind}:{port}"))?;
    let app = build_gateway_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
        "messenger": state.messenger.is_some(),
        "active_sessions": state.dispatcher.store().active(),
        "training": {
            "accepted": state.training_accepted(),
            "failed": state.training_failed(),
        },
    }))
}
