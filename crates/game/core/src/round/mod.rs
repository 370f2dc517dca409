//! One playthrough of craps, from the come-out roll to a decision.
//!
//! [`Round`] drives [`RoundState`] with real rolls and keeps the rolls it
//! made. A `Round` is reusable: every call to [`Round::play`] starts a fresh
//! round from the same random source.
mod state;

pub use state::{RoundState, TransitionError};

use std::fmt;

use thiserror::Error;

use crate::dice::Roll;
use crate::rng::{RandomSource, RandomSourceError};

/// Dice thrown per roll.
pub const DICE_PER_ROLL: usize = 2;

/// Sides on every die.
pub const SIDES_PER_DIE: u32 = 6;

/// Errors that abort a round before it is decided.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error(transparent)]
    RandomSource(#[from] RandomSourceError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Reusable round player.
pub struct Round {
    source: Box<dyn RandomSource>,
    rolls: Vec<Roll>,
    state: RoundState,
}

impl Round {
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            rolls: Vec::new(),
            state: RoundState::initial(),
        }
    }

    /// Plays a complete round and returns whether it was won.
    ///
    /// Previous rolls are discarded first. There is no cap on the number of
    /// rolls; a round always has at least one.
    ///
    /// On error the round is left undecided with the rolls made so far.
    pub fn play(&mut self) -> Result<bool, RoundError> {
        self.rolls.clear();
        self.state = RoundState::initial();

        loop {
            let roll = Roll::roll(self.source.as_mut(), DICE_PER_ROLL, SIDES_PER_DIE)?;
            self.state = self.state.next(roll.value())?;
            self.rolls.push(roll);
            if self.state.is_terminal() {
                break;
            }
        }

        Ok(self.state.is_win())
    }

    /// Rolls of the latest round in the order they were made.
    pub fn rolls(&self) -> &[Roll] {
        &self.rolls
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_win(&self) -> bool {
        self.state.is_win()
    }
}

impl fmt::Debug for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round")
            .field("rolls", &self.rolls)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
