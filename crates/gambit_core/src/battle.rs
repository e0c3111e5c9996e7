//! One full encounter.
//!
//! A battle resets every team and gambit, then plays turns `1..max_turn`
//! until one team has nothing left to attack. Exhausting the turn bound is
//! an ordinary outcome ([`BattleOutcome::Timeout`]), not an error.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::error::{BattleError, Result};
use crate::gambit::Gambit;
use crate::log::TurnLog;
use crate::team::{Team, TeamId};
use crate::turn::Turn;

/// Default turn bound. Turns `1..DEFAULT_MAX_TURN` are played.
pub const DEFAULT_MAX_TURN: u32 = 1000;

/// Code reported for a timeout by [`BattleOutcome::code`].
pub const TIMEOUT_CODE: i64 = -1;

/// Result of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// A team defeated every opponent.
    Won(TeamId),
    /// The turn bound ran out.
    Timeout,
}

impl BattleOutcome {
    /// Winning team, if any.
    #[must_use]
    pub const fn winner(self) -> Option<TeamId> {
        match self {
            BattleOutcome::Won(team) => Some(team),
            BattleOutcome::Timeout => None,
        }
    }

    /// Team id of the winner, or [`TIMEOUT_CODE`].
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            BattleOutcome::Won(team) => team.0 as i64,
            BattleOutcome::Timeout => TIMEOUT_CODE,
        }
    }
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::Won(team) => write!(f, "team {team} won"),
            BattleOutcome::Timeout => f.write_str("timeout"),
        }
    }
}

/// A simulated encounter. The id only tags tracing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Battle {
    /// Caller-assigned number.
    pub id: u64,
}

impl Battle {
    /// Create battle `id`.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self { id }
    }

    /// Check that teams and gambits can play together.
    ///
    /// Team ids must equal their index and every team needs a gambit.
    pub fn validate(teams: &[Team], gambits: &[Gambit]) -> Result<()> {
        if teams.is_empty() {
            return Err(BattleError::NoTeams);
        }
        if teams.len() != gambits.len() {
            return Err(BattleError::GambitCountMismatch {
                teams: teams.len(),
                gambits: gambits.len(),
            });
        }
        for (index, team) in teams.iter().enumerate() {
            if team.id().index() != index {
                return Err(BattleError::TeamIdMismatch {
                    index,
                    id: team.id(),
                });
            }
            if team.is_empty() {
                return Err(BattleError::EmptyTeam { team: team.id() });
            }
        }
        Ok(())
    }

    /// Play the battle, appending one log per executed hit.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        teams: &mut [Team],
        gambits: &mut [Gambit],
        logs: &mut Vec<TurnLog>,
        rng: &mut R,
        max_turn: u32,
    ) -> Result<BattleOutcome> {
        let _span = debug_span!("battle", id = self.id).entered();
        Self::validate(teams, gambits)?;

        for team in teams.iter_mut() {
            team.reset(rng);
        }
        for gambit in gambits.iter_mut() {
            gambit.reset(teams);
        }

        for turn_id in 1..max_turn {
            let result = Turn::new(turn_id).proceed(teams, gambits, logs, rng)?;
            if let Some(winner) = result.winner() {
                debug!(turn = turn_id, %winner, "Battle won");
                return Ok(BattleOutcome::Won(winner));
            }
        }

        debug!(max_turn, "Battle timed out");
        Ok(BattleOutcome::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::status::{Roster, Side, Status};
    use crate::unit::Unit;
    use std::sync::Arc;

    fn unit(side: Side, life: u32, attack: u32, defence: u32) -> Unit {
        Unit::new(Arc::new(Status::new(side, 0, "u", life, attack, defence, 10)))
    }

    fn standard_teams() -> Vec<Team> {
        let roster = Roster::standard();
        let side = |side| {
            (0..3)
                .map(|i| Unit::new(roster.get(side, i).unwrap()))
                .collect::<Vec<_>>()
        };
        vec![
            Team::new(TeamId(0), side(Side::Player)).unwrap(),
            Team::new(TeamId(1), side(Side::Monster)).unwrap(),
        ]
    }

    #[test]
    fn test_strong_side_wins_first_turn() {
        let mut teams = vec![
            Team::new(TeamId(0), vec![unit(Side::Player, 100, 50, 0)]).unwrap(),
            Team::new(TeamId(1), vec![unit(Side::Player, 1, 0, 0)]).unwrap(),
        ];
        let mut gambits = vec![Gambit::Naive, Gambit::Naive];
        let mut logs = Vec::new();

        let outcome = Battle::new(0)
            .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(8), DEFAULT_MAX_TURN)
            .unwrap();

        assert_eq!(outcome, BattleOutcome::Won(TeamId(0)));
        assert_eq!(outcome.code(), 0);
        assert!(!logs.is_empty());
        assert!(logs.iter().all(|l| l.turn_id == 1));
        assert!(logs
            .iter()
            .any(|l| l.defeated && l.target_side == Side::Player));
    }

    #[test]
    fn test_zero_life_side_loses_on_turn_one() {
        // Monster life 1 always rolls to 0.
        let mut teams = vec![
            Team::new(TeamId(0), vec![unit(Side::Player, 30, 5, 5)]).unwrap(),
            Team::new(TeamId(1), vec![unit(Side::Monster, 1, 50, 5)]).unwrap(),
        ];
        let mut gambits = vec![Gambit::Naive, Gambit::Naive];
        let mut logs = Vec::new();

        let outcome = Battle::new(0)
            .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(1), 10)
            .unwrap();

        assert!(!teams[1].alive());
        assert_eq!(outcome, BattleOutcome::Won(TeamId(0)));
        assert!(logs.is_empty());
    }

    #[test]
    fn test_timeout() {
        let mut teams = vec![
            Team::new(TeamId(0), vec![unit(Side::Player, 500, 0, 0)]).unwrap(),
            Team::new(TeamId(1), vec![unit(Side::Player, 500, 0, 0)]).unwrap(),
        ];
        let mut gambits = vec![Gambit::Naive, Gambit::Cunning];
        let mut logs = Vec::new();

        let outcome = Battle::new(0)
            .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(1), 5)
            .unwrap();

        assert_eq!(outcome, BattleOutcome::Timeout);
        assert_eq!(outcome.code(), TIMEOUT_CODE);
        // Turns 1..5, two hits each.
        assert_eq!(logs.len(), 8);
        assert_eq!(logs.last().unwrap().turn_id, 4);
    }

    #[test]
    fn test_winner_alive_loser_wiped() {
        let mut rng = seeded(77);
        for id in 0..50 {
            let mut teams = standard_teams();
            let mut gambits = vec![Gambit::Cunning, Gambit::Naive];
            let mut logs = Vec::new();
            let outcome = Battle::new(id)
                .simulate(&mut teams, &mut gambits, &mut logs, &mut rng, DEFAULT_MAX_TURN)
                .unwrap();

            if let BattleOutcome::Won(winner) = outcome {
                assert!(teams[winner.index()].alive());
                let loser = 1 - winner.index();
                assert!(!teams[loser].alive());
            }
        }
    }

    #[test]
    fn test_logs_ordered_within_battle() {
        let mut teams = standard_teams();
        let mut gambits = vec![Gambit::Naive, Gambit::Naive];
        let mut logs = Vec::new();
        Battle::new(0)
            .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(5), DEFAULT_MAX_TURN)
            .unwrap();

        assert!(!logs.is_empty());
        assert!(logs
            .windows(2)
            .all(|w| (w[0].turn_id, w[0].order) < (w[1].turn_id, w[1].order)));
    }

    #[test]
    fn test_reset_between_battles() {
        let mut teams = standard_teams();
        let mut gambits = vec![Gambit::Naive, Gambit::Naive];
        let mut rng = seeded(2);
        let battle = Battle::new(0);

        battle
            .simulate(&mut teams, &mut gambits, &mut Vec::new(), &mut rng, DEFAULT_MAX_TURN)
            .unwrap();
        let mut logs = Vec::new();
        battle
            .simulate(&mut teams, &mut gambits, &mut logs, &mut rng, DEFAULT_MAX_TURN)
            .unwrap();

        // A fresh battle starts from full life.
        assert_eq!(logs[0].turn_id, 1);
        assert_eq!(logs[0].damage_cumsum, logs[0].damage);
    }

    #[test]
    fn test_validation() {
        let mut teams = standard_teams();
        let err = Battle::new(0)
            .simulate(&mut teams, &mut [Gambit::Naive], &mut Vec::new(), &mut seeded(0), 10)
            .unwrap_err();
        assert_eq!(
            err,
            BattleError::GambitCountMismatch {
                teams: 2,
                gambits: 1
            }
        );

        teams.swap(0, 1);
        assert_eq!(
            Battle::validate(&teams, &[Gambit::Naive, Gambit::Naive]).unwrap_err(),
            BattleError::TeamIdMismatch {
                index: 0,
                id: TeamId(1)
            }
        );

        assert_eq!(
            Battle::validate(&[], &[]).unwrap_err(),
            BattleError::NoTeams
        );
    }

    #[test]
    fn test_max_turn_one_is_immediate_timeout() {
        let mut teams = standard_teams();
        let mut gambits = vec![Gambit::Naive, Gambit::Naive];
        let mut logs = Vec::new();
        let outcome = Battle::new(0)
            .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(0), 1)
            .unwrap();
        assert_eq!(outcome, BattleOutcome::Timeout);
        assert!(logs.is_empty());
    }
}
