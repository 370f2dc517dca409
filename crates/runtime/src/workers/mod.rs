//! Worker tasks that back the engine.
//!
//! The simulation worker is the single owner of round play; it is spawned
//! lazily by the first attached snapshot stream.

mod simulation;

pub(crate) use simulation::SimulationWorker;
