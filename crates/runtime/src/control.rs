//! State shared between the engine handle, snapshot streams and the worker.
//!
//! Commands are plain atomic writes followed by a wakeup; the worker reads
//! them at batch boundaries. The round and its random source sit behind a
//! mutex that only the worker's batch task ever locks.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{Notify, broadcast, watch};

use craps_core::{Round, Snapshot};

use crate::api::EngineError;
use crate::settings::BatchSize;

/// Item carried by the snapshot broadcast channel.
pub(crate) type StreamItem = Result<Stamped, EngineError>;

/// Snapshot tagged with the session it was committed in.
#[derive(Debug, Clone)]
pub(crate) struct Stamped {
    pub session: u64,
    pub snapshot: Snapshot,
}

/// What the worker should do at its next batch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Idle = 0,
    /// Play a single batch, then fall back to idle.
    Once = 1,
    /// Play batches back to back until stopped.
    Continuous = 2,
}

impl Mode {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Mode::Once,
            2 => Mode::Continuous,
            _ => Mode::Idle,
        }
    }
}

/// Cumulative tally tagged with the session it belongs to.
///
/// `session` advances on every reset so a batch that started before the
/// reset cannot leak its rounds into the new session.
#[derive(Debug, Clone, Default)]
pub(crate) struct Ledger {
    pub session: u64,
    pub snapshot: Snapshot,
}

pub(crate) struct Shared {
    mode: AtomicU8,
    batch_size: AtomicU64,
    subscribers: AtomicUsize,
    worker_active: AtomicBool,
    pub wakeup: Notify,
    pub ledger: watch::Sender<Ledger>,
    pub snapshots: broadcast::Sender<StreamItem>,
    /// Latest fault. Outlives the broadcast slot so a later snapshot cannot
    /// hide it from a consumer that has not read it yet.
    pub faults: watch::Sender<Option<EngineError>>,
    round: Mutex<Round>,
}

impl Shared {
    pub fn new(round: Round) -> Self {
        let (ledger, _) = watch::channel(Ledger::default());
        // Capacity 1: a lagging subscriber only ever finds the newest item.
        let (snapshots, _) = broadcast::channel(1);
        let (faults, _) = watch::channel(None);
        Self {
            mode: AtomicU8::new(Mode::Idle as u8),
            batch_size: AtomicU64::new(BatchSize::ONE.get()),
            subscribers: AtomicUsize::new(0),
            worker_active: AtomicBool::new(false),
            wakeup: Notify::new(),
            ledger,
            snapshots,
            faults,
            round: Mutex::new(round),
        }
    }

    /// Session counter of the live ledger.
    pub fn session(&self) -> u64 {
        self.ledger.borrow().session
    }

    /// Records `error`, then broadcasts it.
    pub fn fault(&self, error: EngineError) {
        self.faults.send_replace(Some(error.clone()));
        let _ = self.snapshots.send(Err(error));
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Stores the batch size, then the mode, then wakes the worker.
    pub fn arm(&self, mode: Mode, batch_size: BatchSize) {
        self.batch_size.store(batch_size.get(), Ordering::Relaxed);
        self.mode.store(mode as u8, Ordering::Release);
        self.wakeup.notify_one();
    }

    pub fn halt(&self) {
        self.mode.store(Mode::Idle as u8, Ordering::Release);
    }

    /// Size of the next batch to play, or `None` when idle.
    ///
    /// A pending single batch is claimed here, so it runs exactly once.
    pub fn take_batch(&self) -> Option<u64> {
        match self.mode() {
            Mode::Idle => None,
            Mode::Continuous => Some(self.batch_size.load(Ordering::Relaxed)),
            Mode::Once => self
                .mode
                .compare_exchange(
                    Mode::Once as u8,
                    Mode::Idle as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .ok()
                .map(|_| self.batch_size.load(Ordering::Relaxed)),
        }
    }

    pub fn subscribers(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    /// Registers a consumer. Returns `true` when the caller must start a
    /// worker because none is running.
    pub fn attach(&self) -> bool {
        self.subscribers.fetch_add(1, Ordering::SeqCst);
        let already_running = self.worker_active.swap(true, Ordering::SeqCst);
        if already_running {
            self.wakeup.notify_one();
        }
        !already_running
    }

    pub fn detach(&self) {
        self.subscribers.fetch_sub(1, Ordering::SeqCst);
        self.wakeup.notify_one();
    }

    /// Called by the worker when it sees no consumers. Returns `true` when the
    /// worker should exit, `false` when a consumer attached in the meantime
    /// and this worker keeps ownership.
    pub fn retire_worker(&self) -> bool {
        self.worker_active.store(false, Ordering::SeqCst);
        if self.subscribers.load(Ordering::SeqCst) == 0 {
            return true;
        }
        // Reclaim unless a freshly spawned worker already did.
        self.worker_active.swap(true, Ordering::SeqCst)
    }

    pub fn is_worker_active(&self) -> bool {
        self.worker_active.load(Ordering::SeqCst)
    }

    /// Locks the round for a batch. A panic in an earlier batch leaves the
    /// round mid-play, which the next `play` resets anyway.
    pub fn round(&self) -> MutexGuard<'_, Round> {
        self.round.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craps_core::ScriptedSource;

    fn shared() -> Shared {
        Shared::new(Round::new(ScriptedSource::cycling([3, 4])))
    }

    #[test]
    fn once_is_claimed_a_single_time() {
        let shared = shared();
        shared.arm(Mode::Once, BatchSize::new(5).unwrap());
        assert_eq!(shared.take_batch(), Some(5));
        assert_eq!(shared.mode(), Mode::Idle);
        assert_eq!(shared.take_batch(), None);
    }

    #[test]
    fn continuous_repeats_until_halted() {
        let shared = shared();
        shared.arm(Mode::Continuous, BatchSize::new(10).unwrap());
        assert_eq!(shared.take_batch(), Some(10));
        assert_eq!(shared.take_batch(), Some(10));
        shared.halt();
        assert_eq!(shared.take_batch(), None);
    }

    #[test]
    fn first_attach_starts_worker() {
        let shared = shared();
        assert!(shared.attach());
        assert!(!shared.attach());
        assert_eq!(shared.subscribers(), 2);

        shared.detach();
        shared.detach();
        assert!(shared.retire_worker());
        assert!(!shared.is_worker_active());
        assert!(shared.attach());
    }

    #[test]
    fn retiring_worker_keeps_ownership_when_consumer_arrives() {
        let shared = shared();
        assert!(shared.attach());
        // Consumer count is non-zero: the worker reclaims its slot.
        assert!(!shared.retire_worker());
        assert!(shared.is_worker_active());
    }

    #[test]
    fn fault_outlives_the_broadcast_slot() {
        let shared = shared();
        let mut faults = shared.faults.subscribe();
        let mut items = shared.snapshots.subscribe();

        shared.fault(EngineError::NoRuntime);
        let _ = shared.snapshots.send(Ok(Stamped {
            session: 0,
            snapshot: Snapshot::empty(),
        }));

        // The error was pushed out of the channel but is still recorded.
        assert!(matches!(
            items.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
        assert!(faults.has_changed().unwrap());
        assert!(matches!(
            *faults.borrow_and_update(),
            Some(EngineError::NoRuntime)
        ));
    }
}
