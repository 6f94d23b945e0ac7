//! Async wiring of the selection engine.
//!
//! The engine itself is runtime-agnostic; this module provides the
//! producer/consumer loop most clients want: orientation samples arrive on a
//! channel from the head-tracking input, a ticker drives decision cycles,
//! and a cancellation token shuts everything down, tearing prediction
//! plugins down on exit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::orientation::OrientationSample;
use crate::selector::SelectionEngine;

/// Runs the selection engine against a live orientation feed.
///
/// Recording is the producer side; decision cycles run on this task, so all
/// geometry and plugin work stays serialized on the consumer side.
pub struct SelectionService {
    engine: Arc<SelectionEngine>,
    cycle_interval: Duration,
}

impl SelectionService {
    /// Create a service driving `engine` at the given cycle interval.
    pub fn new(engine: Arc<SelectionEngine>, cycle_interval: Duration) -> Self {
        Self {
            engine,
            cycle_interval,
        }
    }

    /// Human-readable service name.
    pub fn name(&self) -> &'static str {
        "selection"
    }

    /// Startup info string describing the service configuration.
    pub fn startup_info(&self) -> String {
        format!(
            "cycle interval {:?}, strategy {}",
            self.cycle_interval,
            self.engine.resolver_name()
        )
    }

    /// Process orientation samples and run decision cycles until cancelled
    /// or the sample channel closes.
    pub async fn run(
        self,
        mut sample_rx: mpsc::Receiver<OrientationSample>,
        cancellation_token: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(self.cycle_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(info = %self.startup_info(), "selection service started");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    debug!("selection service cancelled");
                    break;
                }
                sample = sample_rx.recv() => {
                    match sample {
                        Some(sample) => {
                            if let Err(e) = self.engine.record_orientation(sample) {
                                warn!(error = %e, "dropped orientation sample");
                            }
                        }
                        None => {
                            debug!("orientation channel closed");
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    match self.engine.select_once() {
                        Ok(outcome) => trace!(?outcome, "selection cycle complete"),
                        Err(e) => warn!(error = %e, "selection cycle failed"),
                    }
                }
            }
        }

        self.engine.shutdown();
        info!("selection service stopped");
    }
}

impl std::fmt::Debug for SelectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionService")
            .field("cycle_interval", &self.cycle_interval)
            .finish_non_exhaustive()
    }
}
