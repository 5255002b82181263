//! Metrics collection and export for quandary.
//!
//! Crates record through the `metrics` facade macros re-exported here. When
//! the `prometheus` feature is enabled, [`init_metrics`] installs a Prometheus
//! recorder whose handle renders the `/metrics` endpoint.
//!
//! ```rust,ignore
//! use quandary_metrics::{counter, dispatch};
//!
//! counter!(dispatch::EVENTS_TOTAL, "kind" => "message").increment(1);
//! ```

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

pub use metrics::{counter, gauge, histogram};
