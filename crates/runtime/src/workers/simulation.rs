//! Simulation worker that plays batches of rounds and publishes snapshots.
//!
//! The worker is the only code that plays rounds or grows the tally. It
//! lives as long as at least one snapshot stream is attached and re-reads the
//! mode flag between batches, so `stop()` and detaching take effect after the
//! in-flight batch at the latest.

use std::sync::Arc;

use tracing::{debug, error, trace};

use craps_core::{Round, RoundError, Snapshot};

use crate::api::EngineError;
use crate::control::{Shared, Stamped};

/// Result of playing one batch on the blocking pool.
struct BatchOutcome {
    /// Tally of this batch alone, with the last round's rolls when the batch
    /// completed.
    batch: Snapshot,
    fault: Option<RoundError>,
}

pub(crate) struct SimulationWorker {
    shared: Arc<Shared>,
}

impl SimulationWorker {
    pub fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Main worker loop.
    pub async fn run(self) {
        debug!(target: "runtime::worker", "simulation worker started");

        loop {
            if self.shared.subscribers() == 0 {
                if self.shared.retire_worker() {
                    break;
                }
                continue;
            }

            let notified = self.shared.wakeup.notified();
            match self.shared.take_batch() {
                Some(rounds) => {
                    if let Err(error) = self.play_batch(rounds).await {
                        error!(target: "runtime::worker", error = %error, "batch failed, halting");
                        self.shared.fault(error);
                    }
                    // Let command delivery and consumers run between batches.
                    tokio::task::yield_now().await;
                }
                None => notified.await,
            }
        }

        debug!(target: "runtime::worker", "simulation worker stopped");
    }

    /// Plays `rounds` rounds, commits the tally and publishes a snapshot.
    async fn play_batch(&self, rounds: u64) -> Result<(), EngineError> {
        let session = self.shared.session();
        let shared = Arc::clone(&self.shared);

        let outcome = tokio::task::spawn_blocking(move || play_rounds(&mut shared.round(), rounds))
            .await
            .map_err(|error| {
                self.shared.halt();
                EngineError::from_join(error)
            })?;

        // Idle before the tally lands, so a command sent after seeing the
        // faulted tally is not cancelled.
        if outcome.fault.is_some() {
            self.shared.halt();
        }

        let mut published = None;
        self.shared.ledger.send_if_modified(|ledger| {
            if ledger.session != session {
                return false;
            }
            let tally = &ledger.snapshot;
            ledger.snapshot = match outcome.fault {
                None => outcome.batch.accumulate(tally.wins(), tally.losses()),
                Some(_) => tally.accumulate(outcome.batch.wins(), outcome.batch.losses()),
            };
            published = Some(ledger.snapshot.clone());
            true
        });

        if let Some(source) = outcome.fault {
            return Err(EngineError::BatchFaulted {
                completed: outcome.batch.rounds(),
                source,
            });
        }

        match published {
            Some(snapshot) => {
                trace!(
                    target: "runtime::worker",
                    rounds,
                    wins = snapshot.wins(),
                    losses = snapshot.losses(),
                    "batch complete"
                );
                if self.shared.snapshots.send(Ok(Stamped { session, snapshot })).is_err() {
                    trace!(target: "runtime::worker", "no receivers for snapshot");
                }
            }
            None => debug!(
                target: "runtime::worker",
                rounds,
                "session reset during batch, discarding results"
            ),
        }

        Ok(())
    }
}

/// Plays up to `rounds` rounds, stopping at the first fault.
fn play_rounds(round: &mut Round, rounds: u64) -> BatchOutcome {
    let (mut wins, mut losses) = (0, 0);
    for _ in 0..rounds {
        match round.play() {
            Ok(true) => wins += 1,
            Ok(false) => losses += 1,
            Err(fault) => {
                return BatchOutcome {
                    batch: Snapshot::empty().accumulate(wins, losses),
                    fault: Some(fault),
                };
            }
        }
    }
    BatchOutcome {
        batch: Snapshot::from_round(round, wins, losses),
        fault: None,
    }
}
