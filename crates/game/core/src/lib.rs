//! Deterministic craps rules and data types shared by the runtime.
//!
//! `craps-core` defines the canonical pass-line rule ([`RoundState::next`]),
//! the values a simulation reports ([`Roll`], [`Snapshot`]) and the
//! [`RandomSource`] abstraction dice are drawn from. Everything here is
//! synchronous and free of I/O; scheduling and streaming live in the runtime
//! crate.
pub mod dice;
pub mod rng;
pub mod round;
pub mod snapshot;

pub use dice::Roll;
pub use rng::{PcgSource, RandomSource, RandomSourceError, ScriptedSource};
pub use round::{DICE_PER_ROLL, Round, RoundError, RoundState, SIDES_PER_DIE, TransitionError};
pub use snapshot::Snapshot;
