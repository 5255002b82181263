//! Fire-and-forget training submission.

use std::sync::Arc;

use {
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, warn},
};

#[cfg(feature = "metrics")]
use quandary_metrics::{counter, nlu as nlu_metrics};

use crate::{TrainingSample, Understander};

/// Result of one background training submission.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub sample: TrainingSample,
    pub error: Option<String>,
}

impl TrainingOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Submits training samples without blocking the conversation.
///
/// Failures never reach the user. They are logged and, when a channel is
/// attached, reported to whoever monitors training health.
#[derive(Clone, Default)]
pub struct TrainingSubmitter {
    outcomes: Option<mpsc::UnboundedSender<TrainingOutcome>>,
}

impl TrainingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(outcomes: mpsc::UnboundedSender<TrainingOutcome>) -> Self {
        Self {
            outcomes: Some(outcomes),
        }
    }

    pub fn submit(&self, nlu: Arc<dyn Understander>, sample: TrainingSample) -> JoinHandle<()> {
        let outcomes = self.outcomes.clone();
        #[cfg(feature = "metrics")]
        counter!(nlu_metrics::TRAINING_SUBMITTED_TOTAL).increment(1);

        tokio::spawn(async move {
            let error = match nlu.train(&sample).await {
                Ok(()) => {
                    debug!(text = %sample.text, "training submitted");
                    None
                },
                Err(e) => {
                    warn!(text = %sample.text, error = %e, "training submission failed");
                    #[cfg(feature = "metrics")]
                    counter!(nlu_metrics::TRAINING_FAILED_TOTAL).increment(1);
                    Some(e.to_string())
                },
            };
            if let Some(tx) = outcomes {
                let _ = tx.send(TrainingOutcome { sample, error });
            }
        })
    }
}
