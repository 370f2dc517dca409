//! Formatting of snapshots for stdout.
use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use craps_core::{Roll, RoundState, Snapshot};

use crate::config::OutputFormat;

/// One reported snapshot, numbered in arrival order.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub batch: u64,
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: f64,
    pub state: RoundState,
    pub rolls: &'a [Roll],
}

impl<'a> Report<'a> {
    pub fn new(batch: u64, snapshot: &'a Snapshot) -> Self {
        Self {
            batch,
            rounds: snapshot.rounds(),
            wins: snapshot.wins(),
            losses: snapshot.losses(),
            win_rate: snapshot.win_rate(),
            state: snapshot.state(),
            rolls: snapshot.rolls(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => Ok(serde_json::to_string(self)?),
        }
    }

    fn to_text(&self) -> String {
        let mut line = format!(
            "#{:<4} rounds={} wins={} losses={} win_rate={:.4} last={}",
            self.batch, self.rounds, self.wins, self.losses, self.win_rate, self.state
        );
        for roll in self.rolls {
            let faces: Vec<String> = roll.dice().iter().map(u32::to_string).collect();
            let _ = write!(line, " {}={}", faces.join("+"), roll.value());
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let round = {
            let mut round = craps_core::Round::new(craps_core::ScriptedSource::new([2, 3, 1, 4]));
            round.play().unwrap();
            round
        };
        Snapshot::from_round(&round, 1, 3)
    }

    #[test]
    fn text_lists_rolls_of_last_round() {
        let snapshot = snapshot();
        let line = Report::new(2, &snapshot).render(OutputFormat::Text).unwrap();
        assert_eq!(
            line,
            "#2    rounds=4 wins=1 losses=3 win_rate=0.2500 last=win 2+3=5 1+4=5"
        );
    }

    #[test]
    fn json_is_a_single_line() {
        let snapshot = snapshot();
        let line = Report::new(1, &snapshot).render(OutputFormat::Json).unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["rounds"], 4);
        assert_eq!(value["wins"], 1);
        assert_eq!(value["rolls"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_snapshot_reports_no_rolls() {
        let snapshot = Snapshot::empty();
        let line = Report::new(1, &snapshot).render(OutputFormat::Text).unwrap();
        assert!(line.ends_with("last=come_out"));
    }
}
