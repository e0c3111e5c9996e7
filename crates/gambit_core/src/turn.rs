//! One round of a battle.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::command::Command;
use crate::error::{BattleError, Result};
use crate::gambit::Gambit;
use crate::log::TurnLog;
use crate::team::{all_units, find_unit, Team, TeamId};
use crate::unit::{Unit, UnitKey};

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnResult {
    /// Nobody won; play another turn.
    Keeping,
    /// The given team has no attackable opponent left.
    Finished(TeamId),
}

impl TurnResult {
    /// Winning team, if any.
    #[must_use]
    pub const fn winner(self) -> Option<TeamId> {
        match self {
            TurnResult::Keeping => None,
            TurnResult::Finished(team) => Some(team),
        }
    }
}

/// A single resolution pass where every living unit acts once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Turn {
    /// Turn number, starting at 1.
    pub id: u32,
}

impl Turn {
    /// Create turn `id`.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Resolve the turn.
    ///
    /// Every unit, dead or alive, draws a fresh priority; units then act in
    /// descending priority with input order breaking exact ties. Dead units
    /// are skipped but keep their `order` slot.
    ///
    /// `gambits` is indexed by team id; a team without a gambit is a
    /// [`BattleError::GambitCountMismatch`].
    pub fn proceed<R: Rng + ?Sized>(
        &self,
        teams: &mut [Team],
        gambits: &mut [Gambit],
        logs: &mut Vec<TurnLog>,
        rng: &mut R,
    ) -> Result<TurnResult> {
        let schedule = action_order(teams, rng);
        let commands = Command::available();

        for (order, key) in schedule.into_iter().enumerate() {
            let order = order as u32;
            let source = find_unit(teams, key)?;
            if !source.is_alive() {
                continue;
            }
            if !has_opponent(teams, source) {
                debug!(turn = self.id, winner = %key.team, "No opponent left");
                return Ok(TurnResult::Finished(key.team));
            }

            let selection = {
                let candidates: Vec<&Unit> = all_units(teams).collect();
                let gambit_count = gambits.len();
                let gambit = gambits.get_mut(key.team.index()).ok_or(
                    BattleError::GambitCountMismatch {
                        teams: teams.len(),
                        gambits: gambit_count,
                    },
                )?;
                gambit.select_command(source, &candidates, &commands, rng)?
            };
            trace!(turn = self.id, order, source = %key, targets = ?selection.targets, "Selected");

            selection
                .command
                .execute(self.id, order, key, &selection.targets, teams, logs, rng)?;

            let source = find_unit(teams, key)?;
            if !has_opponent(teams, source) {
                debug!(turn = self.id, winner = %key.team, "Battle decided");
                return Ok(TurnResult::Finished(key.team));
            }
        }

        Ok(TurnResult::Keeping)
    }
}

/// Units sorted by a fresh priority draw, highest first.
fn action_order<R: Rng + ?Sized>(teams: &[Team], rng: &mut R) -> Vec<UnitKey> {
    let mut drawn: Vec<(UnitKey, f64)> = all_units(teams)
        .map(|u| (u.key(), u.calc_action_priority(rng)))
        .collect();
    // Stable: exact ties keep team/slot order.
    drawn.sort_by(|a, b| b.1.total_cmp(&a.1));
    drawn.into_iter().map(|(key, _)| key).collect()
}

/// Whether any unit in the battle can be attacked by `source`.
fn has_opponent(teams: &[Team], source: &Unit) -> bool {
    all_units(teams).any(|u| source.can_attack(u))
}
