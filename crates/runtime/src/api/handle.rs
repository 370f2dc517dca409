//! Cloneable façade for issuing commands to the engine.
//!
//! [`SimulationEngine`] hides the shared flags and channel plumbing. Every
//! command returns immediately; the work happens on the worker.
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::debug;

use craps_core::Snapshot;

use super::stream::SnapshotStream;
use crate::control::{Mode, Shared};
use crate::settings::BatchSize;
use crate::workers::SimulationWorker;

/// Client-facing handle to the craps simulation.
#[derive(Clone)]
pub struct SimulationEngine {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl SimulationEngine {
    pub(crate) fn new(shared: Arc<Shared>, runtime: Handle) -> Self {
        Self { shared, runtime }
    }

    /// Play batches of `batch_size` rounds back to back until stopped.
    pub fn run_continuous(&self, batch_size: BatchSize) {
        debug!(target: "runtime::engine", %batch_size, "run continuous");
        self.shared.arm(Mode::Continuous, batch_size);
    }

    /// Play a single batch of `batch_size` rounds.
    pub fn run_once(&self, batch_size: BatchSize) {
        debug!(target: "runtime::engine", %batch_size, "run once");
        self.shared.arm(Mode::Once, batch_size);
    }

    /// Return to idle after the batch in flight, if any.
    pub fn stop(&self) {
        debug!(target: "runtime::engine", "stop");
        self.shared.halt();
    }

    /// Stop and start a new session with an empty tally.
    ///
    /// Nothing is published; read [`SimulationEngine::current_snapshot`] for
    /// the cleared state. Results of a batch still in flight are discarded.
    pub fn reset(&self) {
        debug!(target: "runtime::engine", "reset");
        self.shared.halt();
        self.shared.ledger.send_modify(|ledger| {
            ledger.session += 1;
            ledger.snapshot = Snapshot::empty();
        });
    }

    /// Live tally and last completed round, independent of any stream.
    pub fn current_snapshot(&self) -> Snapshot {
        self.shared.ledger.borrow().snapshot.clone()
    }

    /// Attach a consumer to the snapshot stream.
    ///
    /// The first attached consumer starts the worker; it halts after the last
    /// one is dropped. Commands issued while nobody is attached take effect
    /// on the next attach.
    pub fn snapshots(&self) -> SnapshotStream {
        let receiver = self.shared.snapshots.subscribe();
        if self.shared.attach() {
            debug!(target: "runtime::engine", "starting simulation worker");
            let worker = SimulationWorker::new(Arc::clone(&self.shared));
            self.runtime.spawn(worker.run());
        }
        SnapshotStream::new(receiver, Arc::clone(&self.shared))
    }

    pub fn mode(&self) -> Mode {
        self.shared.mode()
    }

    /// Whether a batch is requested or continuous play is armed.
    pub fn is_running(&self) -> bool {
        self.mode() != Mode::Idle
    }

    /// Number of attached snapshot streams.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers()
    }

    /// Counter advanced by every reset.
    pub(crate) fn session(&self) -> u64 {
        self.shared.session()
    }

    /// Whether a worker task currently exists.
    pub fn has_worker(&self) -> bool {
        self.shared.is_worker_active()
    }
}
