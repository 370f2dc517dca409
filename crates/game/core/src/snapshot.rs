//! Immutable summaries of a simulation session.

use crate::dice::Roll;
use crate::round::{Round, RoundState};

/// Point-in-time view of a session: the latest round and the running tally.
///
/// No wagering is modelled; only wins and losses are counted. A snapshot
/// owns copies of everything it reports, so holders may keep it for as long
/// as they like.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    rolls: Vec<Roll>,
    state: RoundState,
    wins: u64,
    losses: u64,
}

impl Snapshot {
    /// Snapshot of a session in which nothing has been played.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Captures the latest state of `round` together with a tally.
    pub fn from_round(round: &Round, wins: u64, losses: u64) -> Self {
        Self {
            rolls: round.rolls().to_vec(),
            state: round.state(),
            wins,
            losses,
        }
    }

    /// Same last round, tally increased by the given counts.
    pub fn accumulate(&self, wins: u64, losses: u64) -> Self {
        Self {
            rolls: self.rolls.clone(),
            state: self.state,
            wins: self.wins + wins,
            losses: self.losses + losses,
        }
    }

    /// Rolls of the most recently completed round.
    pub fn rolls(&self) -> &[Roll] {
        &self.rolls
    }

    /// State the most recent round ended in; [`RoundState::ComeOut`] before
    /// any round completed.
    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_win(&self) -> bool {
        self.state.is_win()
    }

    pub fn wins(&self) -> u64 {
        self.wins
    }

    pub fn losses(&self) -> u64 {
        self.losses
    }

    pub fn rounds(&self) -> u64 {
        self.wins + self.losses
    }

    /// Fraction of rounds won, `0.0` when nothing was played.
    pub fn win_rate(&self) -> f64 {
        match self.rounds() {
            0 => 0.0,
            rounds => self.wins as f64 / rounds as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;

    #[test]
    fn empty_snapshot_has_no_history() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.rolls().is_empty());
        assert_eq!(snapshot.state(), RoundState::ComeOut);
        assert!(!snapshot.is_win());
        assert_eq!(snapshot.rounds(), 0);
        assert_eq!(snapshot.win_rate(), 0.0);
    }

    #[test]
    fn captures_round_and_tally() {
        let mut round = Round::new(ScriptedSource::new([5, 6]));
        round.play().unwrap();

        let snapshot = Snapshot::from_round(&round, 3, 1);
        assert_eq!(snapshot.rolls(), round.rolls());
        assert!(snapshot.is_win());
        assert_eq!(snapshot.rounds(), 4);
        assert_eq!(snapshot.win_rate(), 0.75);
    }

    #[test]
    fn accumulate_keeps_last_round() {
        let mut round = Round::new(ScriptedSource::new([1, 1]));
        round.play().unwrap();

        let base = Snapshot::from_round(&round, 1, 1);
        let next = base.accumulate(2, 5);
        assert_eq!(next.rolls(), base.rolls());
        assert_eq!(next.state(), RoundState::Loss);
        assert_eq!((next.wins(), next.losses()), (3, 6));
    }
}
