//! Pass-line round automaton.
//!
//! The whole rule set lives in [`RoundState::next`], a pure function of the
//! current state (which carries the point once established) and the value of
//! the latest roll.

use std::fmt;

use thiserror::Error;

/// Values that end a round in the shooter's favour on the come-out roll.
const NATURALS: [u32; 2] = [7, 11];

/// Values that end a round against the shooter on the come-out roll.
const CRAPS: [u32; 3] = [2, 3, 12];

/// Value that loses once a point is established.
const SEVEN_OUT: u32 = 7;

/// Where a round stands after its latest roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundState {
    /// Awaiting the first roll.
    #[default]
    ComeOut,
    /// A point was established; the round continues until it repeats or a 7
    /// shows.
    Point(u32),
    Win,
    Loss,
}

/// Attempted to roll in a round that already finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("round already finished with {state}")]
pub struct TransitionError {
    pub state: RoundState,
}

impl RoundState {
    pub const fn initial() -> Self {
        RoundState::ComeOut
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, RoundState::Win | RoundState::Loss)
    }

    pub const fn is_win(self) -> bool {
        matches!(self, RoundState::Win)
    }

    /// The established point, if any.
    pub const fn point(self) -> Option<u32> {
        match self {
            RoundState::Point(point) => Some(point),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::ComeOut => "come_out",
            RoundState::Point(_) => "point",
            RoundState::Win => "win",
            RoundState::Loss => "loss",
        }
    }

    /// Applies a roll of `value` to this state.
    ///
    /// Terminal states accept no further rolls.
    pub fn next(self, value: u32) -> Result<Self, TransitionError> {
        let next = match self {
            RoundState::ComeOut if NATURALS.contains(&value) => RoundState::Win,
            RoundState::ComeOut if CRAPS.contains(&value) => RoundState::Loss,
            RoundState::ComeOut => RoundState::Point(value),
            RoundState::Point(point) if value == point => RoundState::Win,
            RoundState::Point(_) if value == SEVEN_OUT => RoundState::Loss,
            RoundState::Point(point) => RoundState::Point(point),
            RoundState::Win | RoundState::Loss => return Err(TransitionError { state: self }),
        };
        Ok(next)
    }

    /// Runs a whole round from [`RoundState::ComeOut`] over pre-rolled values.
    ///
    /// Returns the state reached after the last value. Values left over once
    /// the round is decided are rejected.
    pub fn replay<I>(values: I) -> Result<Self, TransitionError>
    where
        I: IntoIterator<Item = u32>,
    {
        values
            .into_iter()
            .try_fold(RoundState::initial(), |state, value| state.next(value))
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundState::Point(point) => write!(f, "point({point})"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn come_out_naturals_win() {
        assert_eq!(RoundState::ComeOut.next(7), Ok(RoundState::Win));
        assert_eq!(RoundState::ComeOut.next(11), Ok(RoundState::Win));
    }

    #[test]
    fn come_out_craps_lose() {
        for value in [2, 3, 12] {
            assert_eq!(RoundState::ComeOut.next(value), Ok(RoundState::Loss));
        }
    }

    #[test]
    fn come_out_sets_point() {
        for value in [4, 5, 6, 8, 9, 10] {
            let state = RoundState::ComeOut.next(value).unwrap();
            assert_eq!(state, RoundState::Point(value));
            assert_eq!(state.point(), Some(value));
            assert!(!state.is_terminal());
        }
    }

    #[test]
    fn point_transitions() {
        let point = RoundState::Point(6);
        assert_eq!(point.next(6), Ok(RoundState::Win));
        assert_eq!(point.next(7), Ok(RoundState::Loss));
        for value in [2, 3, 4, 5, 8, 9, 10, 11, 12] {
            assert_eq!(point.next(value), Ok(point));
        }
    }

    #[test]
    fn terminal_states_reject_rolls() {
        for state in [RoundState::Win, RoundState::Loss] {
            assert_eq!(state.next(7), Err(TransitionError { state }));
        }
    }

    #[test]
    fn scripted_sequences_are_reproducible() {
        assert_eq!(RoundState::replay([5]), Ok(RoundState::Point(5)));
        assert_eq!(RoundState::replay([5, 7]), Ok(RoundState::Loss));
        assert_eq!(RoundState::replay([8, 3]), Ok(RoundState::Point(8)));
        assert_eq!(RoundState::replay([8, 3, 8]), Ok(RoundState::Win));
        assert_eq!(RoundState::replay(Vec::<u32>::new()), Ok(RoundState::ComeOut));
    }

    #[test]
    fn replay_rejects_rolls_after_decision() {
        assert_eq!(
            RoundState::replay([7, 4]),
            Err(TransitionError {
                state: RoundState::Win
            })
        );
    }

    #[test]
    fn display_names_the_point() {
        assert_eq!(RoundState::Point(9).to_string(), "point(9)");
        assert_eq!(RoundState::Loss.to_string(), "loss");
    }
}
