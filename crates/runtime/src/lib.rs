//! Runtime orchestration for the craps simulation.
//!
//! This crate runs rounds from `craps-core` on a background worker and
//! streams immutable [`craps_core::Snapshot`]s to whoever is attached.
//! Consumers build a [`SimulationEngine`], issue fire-and-forget commands and
//! read snapshots through [`SnapshotStream`] or a presentation [`Session`].
//!
//! Modules are organized by responsibility:
//! - [`api`] exposes the engine handle, stream and error types
//! - [`engine`] hosts the builder
//! - [`settings`] bridges the batch-size preference
//! - [`session`] adapts the engine for a display layer
//! - `workers` keeps the background task internal to the crate
pub mod api;
pub mod config;
pub mod engine;
pub mod session;
pub mod settings;

mod control;
mod workers;

pub use api::{EngineError, Result, SimulationEngine, SnapshotStream};
pub use config::EngineConfig;
pub use control::Mode;
pub use engine::EngineBuilder;
pub use session::Session;
pub use settings::{BatchSize, BatchSizeSettings, MAX_BATCH_EXPONENT, SettingsError, SettingsSource};
