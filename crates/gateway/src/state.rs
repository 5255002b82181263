use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[cfg(feature = "metrics")]
use quandary_metrics::MetricsHandle;

use {quandary_dispatch::Dispatcher, quandary_messenger::MessengerAccountConfig};

/// Shared state behind every route.
pub struct GatewayState {
    pub version: String,
    pub dispatcher: Arc<Dispatcher>,
    /// `None` when no page is configured; the webhook then refuses traffic.
    pub messenger: Option<MessengerAccountConfig>,
    #[cfg(feature = "metrics")]
    pub metrics_handle: Option<MetricsHandle>,
    training_accepted: AtomicU64,
    training_failed: AtomicU64,
}

impl GatewayState {
    pub fn new(dispatcher: Arc<Dispatcher>, messenger: Option<MessengerAccountConfig>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            dispatcher,
            messenger,
            #[cfg(feature = "metrics")]
            metrics_handle: None,
            training_accepted: AtomicU64::new(0),
            training_failed: AtomicU64::new(0),
        }
    }

    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics_handle(mut self, handle: MetricsHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    pub(crate) fn record_training(&self, accepted: bool) -> u64 {
        let counter = if accepted {
            &self.training_accepted
        } else {
            &self.training_failed
        };
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn training_accepted(&self) -> u64 {
        self.training_accepted.load(Ordering::Relaxed)
    }

    pub fn training_failed(&self) -> u64 {
        self.training_failed.load(Ordering::Relaxed)
    }
}
