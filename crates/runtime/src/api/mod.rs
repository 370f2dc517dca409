//! Public engine API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration and workers.

pub mod errors;
pub mod handle;
pub mod stream;

pub use errors::{EngineError, Result};
pub use handle::SimulationEngine;
pub use stream::SnapshotStream;
