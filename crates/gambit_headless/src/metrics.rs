//! Battle metrics collection.
//!
//! Per-battle records plus the aggregates a batch reports: wins per team,
//! timeouts and battle length statistics.

use std::collections::BTreeMap;

use gambit_core::battle::BattleOutcome;
use gambit_core::log::TurnLog;
use gambit_core::team::TeamId;
use serde::{Deserialize, Serialize};

/// Wins per team plus a separate timeout bucket.
///
/// Every recorded battle lands in exactly one bucket, so
/// [`WinTally::total`] equals the number of recorded battles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTally {
    wins: BTreeMap<TeamId, u32>,
    timeouts: u32,
}

impl WinTally {
    /// Create an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one battle.
    pub fn record(&mut self, outcome: BattleOutcome) {
        match outcome {
            BattleOutcome::Won(team) => *self.wins.entry(team).or_default() += 1,
            BattleOutcome::Timeout => self.timeouts += 1,
        }
    }

    /// Battles won by `team`.
    #[must_use]
    pub fn wins(&self, team: TeamId) -> u32 {
        self.wins.get(&team).copied().unwrap_or(0)
    }

    /// Battles that hit the turn bound.
    #[must_use]
    pub fn timeouts(&self) -> u32 {
        self.timeouts
    }

    /// Battles recorded.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.wins.values().sum::<u32>() + self.timeouts
    }

    /// Share of recorded battles won by `team`, 0 when nothing is recorded.
    #[must_use]
    pub fn win_rate(&self, team: TeamId) -> f64 {
        match self.total() {
            0 => 0.0,
            total => f64::from(self.wins(team)) / f64::from(total),
        }
    }

    /// Teams with at least one win, by id.
    pub fn winners(&self) -> impl Iterator<Item = (TeamId, u32)> + '_ {
        self.wins.iter().map(|(&team, &wins)| (team, wins))
    }
}

impl FromIterator<BattleOutcome> for WinTally {
    fn from_iter<I: IntoIterator<Item = BattleOutcome>>(iter: I) -> Self {
        let mut tally = Self::new();
        for outcome in iter {
            tally.record(outcome);
        }
        tally
    }
}

/// Metrics for a single battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Index of the battle within its batch.
    pub battle_id: u64,
    /// Seed the battle's RNG was built from.
    pub seed: u64,
    /// How it ended.
    pub outcome: BattleOutcome,
    /// Turn of the last recorded hit, 0 if nobody acted.
    pub turns: u32,
    /// Number of hits logged.
    pub hits: u32,
    /// Number of units defeated.
    pub defeated: u32,
}

impl BattleRecord {
    /// Summarize a finished battle from its logs.
    #[must_use]
    pub fn from_logs(battle_id: u64, seed: u64, outcome: BattleOutcome, logs: &[TurnLog]) -> Self {
        Self {
            battle_id,
            seed,
            outcome,
            turns: logs.last().map_or(0, |l| l.turn_id),
            hits: logs.len() as u32,
            defeated: logs.iter().filter(|l| l.defeated).count() as u32,
        }
    }
}

/// Aggregate statistics across a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total battles played.
    pub total_battles: u32,
    /// Battles won by each team.
    pub wins_by_team: BTreeMap<TeamId, u32>,
    /// Win rates by team.
    pub win_rates: BTreeMap<TeamId, f64>,
    /// Battles that timed out.
    pub timeouts: u32,
    /// Average battle length in turns.
    pub avg_turns: f64,
    /// Shortest battle.
    pub min_turns: u32,
    /// Longest battle.
    pub max_turns: u32,
    /// Average hits per battle.
    pub avg_hits: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of battle records.
    #[must_use]
    pub fn from_records(records: &[BattleRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let tally: WinTally = records.iter().map(|r| r.outcome).collect();
        let count = records.len() as f64;

        Self {
            total_battles: tally.total(),
            wins_by_team: tally.winners().collect(),
            win_rates: tally
                .winners()
                .map(|(team, _)| (team, tally.win_rate(team)))
                .collect(),
            timeouts: tally.timeouts(),
            avg_turns: records.iter().map(|r| f64::from(r.turns)).sum::<f64>() / count,
            min_turns: records.iter().map(|r| r.turns).min().unwrap_or(0),
            max_turns: records.iter().map(|r| r.turns).max().unwrap_or(0),
            avg_hits: records.iter().map(|r| f64::from(r.hits)).sum::<f64>() / count,
        }
    }

    /// Human-readable summary lines.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("battles: {}", self.total_battles)];
        for (team, rate) in &self.win_rates {
            lines.push(format!(
                "team {team}: {} wins ({:.1}%)",
                self.wins_by_team.get(team).copied().unwrap_or(0),
                rate * 100.0
            ));
        }
        lines.push(format!("timeouts: {}", self.timeouts));
        lines.push(format!(
            "turns: avg {:.2}, min {}, max {}",
            self.avg_turns, self.min_turns, self.max_turns
        ));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, outcome: BattleOutcome, turns: u32) -> BattleRecord {
        BattleRecord {
            battle_id: id,
            seed: id,
            outcome,
            turns,
            hits: turns * 2,
            defeated: 0,
        }
    }

    #[test]
    fn test_tally_buckets() {
        let mut tally = WinTally::new();
        tally.record(BattleOutcome::Won(TeamId(0)));
        tally.record(BattleOutcome::Won(TeamId(0)));
        tally.record(BattleOutcome::Won(TeamId(1)));
        tally.record(BattleOutcome::Timeout);

        assert_eq!(tally.wins(TeamId(0)), 2);
        assert_eq!(tally.wins(TeamId(1)), 1);
        assert_eq!(tally.wins(TeamId(7)), 0);
        assert_eq!(tally.timeouts(), 1);
        assert_eq!(tally.total(), 4);
        assert!((tally.win_rate(TeamId(0)) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_tally_rate() {
        assert_eq!(WinTally::new().win_rate(TeamId(0)), 0.0);
    }

    #[test]
    fn test_summary_from_records() {
        let records = vec![
            record(0, BattleOutcome::Won(TeamId(0)), 3),
            record(1, BattleOutcome::Won(TeamId(1)), 5),
            record(2, BattleOutcome::Won(TeamId(0)), 7),
            record(3, BattleOutcome::Timeout, 9),
        ];
        let summary = BatchSummary::from_records(&records);

        assert_eq!(summary.total_battles, 4);
        assert_eq!(summary.wins_by_team[&TeamId(0)], 2);
        assert!((summary.win_rates[&TeamId(1)] - 0.25).abs() < f64::EPSILON);
        assert_eq!(summary.timeouts, 1);
        assert_eq!((summary.min_turns, summary.max_turns), (3, 9));
        assert!((summary.avg_turns - 6.0).abs() < f64::EPSILON);
        assert!(summary.to_lines()[0].contains('4'));
    }

    #[test]
    fn test_summary_empty() {
        let summary = BatchSummary::from_records(&[]);
        assert_eq!(summary.total_battles, 0);
        assert!(summary.wins_by_team.is_empty());
    }

    #[test]
    fn test_tally_json_round_trip() {
        let tally: WinTally = [BattleOutcome::Won(TeamId(1)), BattleOutcome::Timeout]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&tally).unwrap();
        let back: WinTally = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tally);
    }
}
