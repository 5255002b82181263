//! Gateway: the HTTP server that receives Messenger webhooks and feeds them
//! to the dispatcher.
//!
//! Lifecycle:
//! 1. Load + validate config
//! 2. Open the session store and NLU client, build the dispatcher
//! 3. Start the training monitor
//! 4. Serve `/health`, `/webhook` and `/metrics`

#[cfg(feature = "prometheus")]
pub mod metrics_routes;
pub mod server;
pub mod services;
pub mod state;
pub mod training_monitor;
pub mod webhook_routes;
