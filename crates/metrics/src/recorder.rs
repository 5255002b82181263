//! Metrics recorder initialization.

use {anyhow::Result, tracing::info};

/// Handle to the installed recorder.
#[derive(Clone)]
pub struct MetricsHandle {
    #[cfg(feature = "prometheus")]
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
}

impl MetricsHandle {
    /// Render metrics in Prometheus text format.
    ///
    /// Empty when metrics are disabled or the exporter is not compiled in.
    #[must_use]
    pub fn render(&self) -> String {
        #[cfg(feature = "prometheus")]
        {
            self.prometheus_handle
                .as_ref()
                .map(|h| h.render())
                .unwrap_or_default()
        }
        #[cfg(not(feature = "prometheus"))]
        {
            String::new()
        }
    }

    fn disabled() -> Self {
        Self {
            #[cfg(feature = "prometheus")]
            prometheus_handle: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsRecorderConfig {
    pub enabled: bool,
    /// Labels attached to every metric (e.g. `instance`).
    pub global_labels: Vec<(String, String)>,
}

/// Install the global metrics recorder.
///
/// Call once at startup. Without the `prometheus` feature, or with
/// `enabled = false`, no recorder is installed and the facade macros are
/// no-ops.
pub fn init_metrics(config: MetricsRecorderConfig) -> Result<MetricsHandle> {
    if !config.enabled {
        info!("metrics collection is disabled");
        return Ok(MetricsHandle::disabled());
    }

    #[cfg(feature = "prometheus")]
    {
        let handle = init_prometheus(config)?;
        info!("prometheus metrics recorder installed");
        Ok(MetricsHandle {
            prometheus_handle: Some(handle),
        })
    }

    #[cfg(not(feature = "prometheus"))]
    {
        let _ = config;
        info!("metrics enabled in config but the prometheus feature is not compiled in");
        Ok(MetricsHandle::disabled())
    }
}

#[cfg(feature = "prometheus")]
fn init_prometheus(
    config: MetricsRecorderConfig,
) -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    use {
        crate::{buckets, dispatch, nlu},
        metrics_exporter_prometheus::{Matcher, PrometheusBuilder},
    };

    let mut builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(nlu::REQUEST_DURATION_SECONDS.to_string()),
            buckets::NLU_DURATION,
        )?
        .set_buckets_for_metric(
            Matcher::Full(dispatch::DURATION_SECONDS.to_string()),
            buckets::DISPATCH_DURATION,
        )?;

    for (key, value) in config.global_labels {
        builder = builder.add_global_label(key, value);
    }

    // Installs globally and returns a render handle without spawning a listener.
    Ok(builder.install_recorder()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_renders_nothing() {
        let handle = init_metrics(MetricsRecorderConfig::default()).unwrap();
        assert!(handle.render().is_empty());
    }
}
