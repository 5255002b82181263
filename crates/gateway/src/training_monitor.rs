//! Watches background training submissions.

use std::sync::Arc;

use {
    quandary_nlu::TrainingOutcome,
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, warn},
};

use crate::state::GatewayState;

/// Drain training outcomes until every submitter is dropped.
///
/// Failures are invisible to users, so this is where they surface.
pub fn spawn_training_monitor(
    state: Arc<GatewayState>,
    mut outcomes: mpsc::UnboundedReceiver<TrainingOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            match outcome.error {
                None => {
                    state.record_training(true);
                    debug!(text = %outcome.sample.text, "training sample accepted");
                },
                Some(error) => {
                    let failures = state.record_training(false);
                    warn!(
                        text = %outcome.sample.text,
                        %error,
                        failures,
                        "training sample was not accepted"
                    );
                },
            }
        }
        debug!("training monitor stopped");
    })
}
