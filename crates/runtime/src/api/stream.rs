//! Consumer side of the snapshot broadcast.
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::trace;

use craps_core::Snapshot;

use super::errors::{EngineError, Result};
use crate::control::{Shared, Stamped, StreamItem};

/// Keeps the worker alive while held; dropping it detaches the consumer.
struct Subscription {
    shared: Arc<Shared>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shared.detach();
        trace!(
            target: "runtime::stream",
            remaining = self.shared.subscribers(),
            "snapshot consumer detached"
        );
    }
}

/// Stream of snapshots produced by the engine, in completion order.
///
/// A consumer that falls behind skips straight to the newest snapshot; the
/// worker never waits for it. Snapshots committed before the latest reset
/// are dropped. A fault is never skipped: once one occurs the stream yields
/// it as an [`EngineError`], detaches from the engine and then only returns
/// `None`. Attach a new stream to resume.
pub struct SnapshotStream {
    receiver: broadcast::Receiver<StreamItem>,
    faults: watch::Receiver<Option<EngineError>>,
    shared: Arc<Shared>,
    subscription: Option<Subscription>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: broadcast::Receiver<StreamItem>, shared: Arc<Shared>) -> Self {
        Self {
            receiver,
            faults: shared.faults.subscribe(),
            subscription: Some(Subscription {
                shared: Arc::clone(&shared),
            }),
            shared,
        }
    }

    /// Waits for the next snapshot.
    pub async fn next(&mut self) -> Option<Result<Snapshot>> {
        self.next_stamped()
            .await
            .map(|item| item.map(|stamped| stamped.snapshot))
    }

    /// Like [`SnapshotStream::next`], keeping the session stamp.
    pub(crate) async fn next_stamped(&mut self) -> Option<Result<Stamped>> {
        if self.is_finished() {
            return None;
        }
        loop {
            let item = self.receiver.recv().await;

            // Faults are recorded before anything published after them.
            if let Some(error) = self.unseen_fault() {
                return Some(Err(self.finish(error)));
            }

            match item {
                Ok(Ok(stamped)) => {
                    if stamped.session == self.shared.session() {
                        return Some(Ok(stamped));
                    }
                    trace!(target: "runtime::stream", "dropping snapshot from before reset");
                }
                Ok(Err(error)) => return Some(Err(self.finish(error))),
                Err(RecvError::Lagged(skipped)) => {
                    trace!(target: "runtime::stream", skipped, "consumer lagged, skipping to latest");
                }
                Err(RecvError::Closed) => {
                    self.subscription = None;
                    return None;
                }
            }
        }
    }

    /// Whether the stream has ended and released its consumer slot.
    pub fn is_finished(&self) -> bool {
        self.subscription.is_none()
    }

    fn unseen_fault(&mut self) -> Option<EngineError> {
        if !self.faults.has_changed().unwrap_or(false) {
            return None;
        }
        self.faults.borrow_and_update().clone()
    }

    fn finish(&mut self, error: EngineError) -> EngineError {
        self.subscription = None;
        error
    }
}
