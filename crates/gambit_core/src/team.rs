//! Teams of units.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::unit::{Unit, UnitKey};

/// Team identifier. Doubles as the team's index in a battle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl TeamId {
    /// Position of the team in a battle's team list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, fixed-size group of units.
///
/// Slot indices always equal list positions.
#[derive(Debug, Clone)]
pub struct Team {
    id: TeamId,
    units: Vec<Unit>,
}

impl Team {
    /// Build a team, assigning team id and slot index to every unit.
    pub fn new(id: TeamId, mut units: Vec<Unit>) -> Result<Self> {
        if units.is_empty() {
            return Err(BattleError::EmptyTeam { team: id });
        }
        for (slot, unit) in units.iter_mut().enumerate() {
            unit.team_id = id;
            unit.slot_index = slot;
        }
        Ok(Self { id, units })
    }

    /// Team id.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Units in slot order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Unit in a slot.
    #[must_use]
    pub fn unit(&self, slot: usize) -> Option<&Unit> {
        self.units.get(slot)
    }

    /// Mutable unit in a slot.
    pub fn unit_mut(&mut self, slot: usize) -> Option<&mut Unit> {
        self.units.get_mut(slot)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always false; teams cannot be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Reset every unit for a new battle.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for unit in &mut self.units {
            unit.reset(rng);
        }
    }

    /// Whether any unit is still standing.
    #[must_use]
    pub fn alive(&self) -> bool {
        self.units.iter().any(Unit::is_alive)
    }
}

/// Look up a unit across teams. Team ids are team indices.
pub fn find_unit(teams: &[Team], key: UnitKey) -> Result<&Unit> {
    teams
        .get(key.team.index())
        .and_then(|t| t.unit(key.slot))
        .ok_or(BattleError::UnitNotFound {
            team: key.team,
            slot: key.slot,
        })
}

/// Mutable lookup of a unit across teams.
pub fn find_unit_mut(teams: &mut [Team], key: UnitKey) -> Result<&mut Unit> {
    teams
        .get_mut(key.team.index())
        .and_then(|t| t.unit_mut(key.slot))
        .ok_or(BattleError::UnitNotFound {
            team: key.team,
            slot: key.slot,
        })
}

/// Every unit of every team, team order then slot order.
pub fn all_units(teams: &[Team]) -> impl Iterator<Item = &Unit> {
    teams.iter().flat_map(|t| t.units.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;
    use crate::status::{Roster, Side};

    fn player_team(id: u32) -> Team {
        let roster = Roster::standard();
        let units = (0..3)
            .map(|i| Unit::new(roster.get(Side::Player, i).unwrap()))
            .collect();
        Team::new(TeamId(id), units).unwrap()
    }

    #[test]
    fn test_slots_and_team_assigned() {
        let team = player_team(4);
        for (i, unit) in team.units().iter().enumerate() {
            assert_eq!(unit.slot_index(), i);
            assert_eq!(unit.team_id(), TeamId(4));
        }
    }

    #[test]
    fn test_empty_team_rejected() {
        assert_eq!(
            Team::new(TeamId(0), Vec::new()).unwrap_err(),
            BattleError::EmptyTeam { team: TeamId(0) }
        );
    }

    #[test]
    fn test_alive_tracks_units() {
        let mut team = player_team(0);
        assert!(team.alive());
        for slot in 0..team.len() {
            team.unit_mut(slot).unwrap().apply_damage(u32::MAX);
        }
        assert!(!team.alive());

        team.reset(&mut seeded(0));
        assert!(team.alive());
    }

    #[test]
    fn test_find_unit() {
        let teams = vec![player_team(0), player_team(1)];
        let key = UnitKey {
            team: TeamId(1),
            slot: 2,
        };
        assert_eq!(find_unit(&teams, key).unwrap().status().name, "thief");
        assert!(find_unit(
            &teams,
            UnitKey {
                team: TeamId(2),
                slot: 0
            }
        )
        .is_err());
        assert_eq!(all_units(&teams).count(), 6);
    }
}
