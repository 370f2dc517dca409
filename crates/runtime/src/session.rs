//! Presentation-facing session over an engine.
//!
//! A [`Session`] is what a display layer binds to: it turns button presses
//! into engine commands using the live batch-size setting and exposes the
//! latest snapshot, a running flag and the last stream error as watchable
//! values. Attaching and detaching follow the display's own lifecycle.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use craps_core::Snapshot;

use crate::api::{EngineError, SimulationEngine};
use crate::settings::SettingsSource;

struct SessionState {
    snapshot: watch::Sender<Snapshot>,
    running: watch::Sender<bool>,
    error: watch::Sender<Option<EngineError>>,
}

pub struct Session<S> {
    engine: SimulationEngine,
    settings: S,
    state: Arc<SessionState>,
    forwarder: Option<JoinHandle<()>>,
}

impl<S: SettingsSource> Session<S> {
    pub fn new(engine: SimulationEngine, settings: S) -> Self {
        let (snapshot, _) = watch::channel(engine.current_snapshot());
        let (running, _) = watch::channel(false);
        let (error, _) = watch::channel(None);
        Self {
            engine,
            settings,
            state: Arc::new(SessionState {
                snapshot,
                running,
                error,
            }),
            forwarder: None,
        }
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Latest snapshot shown to the user.
    pub fn snapshot(&self) -> watch::Receiver<Snapshot> {
        self.state.snapshot.subscribe()
    }

    /// Whether continuous play is on.
    pub fn running(&self) -> watch::Receiver<bool> {
        self.state.running.subscribe()
    }

    /// Last stream error, until dismissed.
    pub fn error(&self) -> watch::Receiver<Option<EngineError>> {
        self.state.error.subscribe()
    }

    /// Play continuously in batches of the configured size.
    pub fn run_fast(&self) {
        self.state.running.send_replace(true);
        self.engine.run_continuous(self.settings.batch_size());
    }

    /// Play one batch of the configured size.
    pub fn run_once(&self) {
        self.engine.run_once(self.settings.batch_size());
    }

    pub fn stop(&self) {
        self.engine.stop();
        self.state.running.send_replace(false);
    }

    /// Clear the tally and show an empty snapshot.
    pub fn reset(&self) {
        self.engine.reset();
        self.state.running.send_replace(false);
        self.state.snapshot.send_replace(Snapshot::empty());
    }

    pub fn dismiss_error(&self) {
        self.state.error.send_replace(None);
    }

    pub fn is_attached(&self) -> bool {
        self.forwarder
            .as_ref()
            .is_some_and(|forwarder| !forwarder.is_finished())
    }

    /// Subscribe to engine snapshots and forward them into the session.
    ///
    /// Must be called from within a tokio runtime. Re-attaching after a
    /// stream error starts a fresh subscription.
    pub fn attach(&mut self) {
        if self.is_attached() {
            return;
        }

        let mut stream = self.engine.snapshots();
        let engine = self.engine.clone();
        let state = Arc::clone(&self.state);
        self.forwarder = Some(tokio::spawn(async move {
            while let Some(item) = stream.next_stamped().await {
                match item {
                    Ok(stamped) => {
                        // Checked under the watch lock so a concurrent reset
                        // always has the last word.
                        state.snapshot.send_if_modified(|current| {
                            if engine.session() != stamped.session {
                                return false;
                            }
                            *current = stamped.snapshot;
                            true
                        });
                    }
                    Err(error) => {
                        error!(target: "runtime::session", error = %error, "snapshot stream failed");
                        state.running.send_replace(false);
                        state.error.send_replace(Some(error));
                    }
                }
            }
            debug!(target: "runtime::session", "snapshot stream ended");
        }));
    }

    /// Stop forwarding snapshots. The engine halts once no other consumer
    /// remains attached.
    pub fn detach(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}
