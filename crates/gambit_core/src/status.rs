//! Immutable unit templates.
//!
//! A [`Status`] is identified by its `(side, id)` pair. Everything else on it
//! is payload: two statuses with the same identity are interchangeable.
//! Templates are shared through [`Arc`] by every unit built from them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};

/// Identifier of a status, unique within a side.
pub type StatusId = u32;

/// Faction a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Controlled by the player; stats are visible in logs.
    Player,
    /// Controlled by the game; stats are hidden in logs.
    Monster,
}

impl Side {
    /// Whether the player may observe stats of units on this side.
    ///
    /// This is the only predicate used to redact [`crate::log::TurnLog`]
    /// fields.
    #[must_use]
    pub const fn is_observable(self) -> bool {
        matches!(self, Side::Player)
    }
}

/// Immutable stat template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    /// Faction.
    pub side: Side,
    /// Identifier within the side.
    pub id: StatusId,
    /// Display name.
    pub name: String,
    /// Base maximum life.
    pub life: u32,
    /// Attack power.
    pub attack: u32,
    /// Defence power.
    pub defence: u32,
    /// Speed, drives turn order.
    pub speed: u32,
}

impl Status {
    /// Create a new template.
    #[must_use]
    pub fn new(
        side: Side,
        id: StatusId,
        name: impl Into<String>,
        life: u32,
        attack: u32,
        defence: u32,
        speed: u32,
    ) -> Self {
        Self {
            side,
            id,
            name: name.into(),
            life,
            attack,
            defence,
            speed,
        }
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        (self.side, self.id) == (other.side, other.id)
    }
}

impl Eq for Status {}

impl Hash for Status {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.side.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Serialized form of a [`Roster`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterData {
    statuses: Vec<Status>,
}

/// Set of templates available to a battle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RosterData", into = "RosterData")]
pub struct Roster {
    statuses: Vec<Arc<Status>>,
}

impl Roster {
    /// Build a roster, rejecting duplicate identities.
    pub fn new(statuses: Vec<Status>) -> Result<Self> {
        let mut roster = Self::default();
        for status in statuses {
            roster.insert(status)?;
        }
        Ok(roster)
    }

    /// The built-in knight/archer/thief vs devil/guardian/ogre roster.
    #[must_use]
    pub fn standard() -> Self {
        let statuses = [
            Status::new(Side::Player, 0, "knight", 104, 65, 65, 32),
            Status::new(Side::Player, 1, "archer", 76, 78, 40, 50),
            Status::new(Side::Player, 2, "thief", 89, 52, 37, 68),
            Status::new(Side::Monster, 0, "devil", 71, 54, 24, 38),
            Status::new(Side::Monster, 1, "guardian", 76, 122, 42, 75),
            Status::new(Side::Monster, 2, "ogre", 158, 60, 58, 12),
        ];
        Self {
            statuses: statuses.into_iter().map(Arc::new).collect(),
        }
    }

    /// Add a template.
    pub fn insert(&mut self, status: Status) -> Result<()> {
        if self.contains(status.side, status.id) {
            return Err(BattleError::DuplicateStatus {
                side: status.side,
                id: status.id,
            });
        }
        self.statuses.push(Arc::new(status));
        Ok(())
    }

    /// Whether a template with this identity exists.
    #[must_use]
    pub fn contains(&self, side: Side, id: StatusId) -> bool {
        self.statuses.iter().any(|s| s.side == side && s.id == id)
    }

    /// Shared handle to a template.
    pub fn get(&self, side: Side, id: StatusId) -> Result<Arc<Status>> {
        self.statuses
            .iter()
            .find(|s| s.side == side && s.id == id)
            .cloned()
            .ok_or(BattleError::UnknownStatus { side, id })
    }

    /// Templates of one side, in insertion order.
    pub fn side(&self, side: Side) -> impl Iterator<Item = &Arc<Status>> {
        self.statuses.iter().filter(move |s| s.side == side)
    }

    /// Number of templates on a side.
    #[must_use]
    pub fn count(&self, side: Side) -> usize {
        self.side(side).count()
    }

    /// All templates.
    #[must_use]
    pub fn statuses(&self) -> &[Arc<Status>] {
        &self.statuses
    }

    /// Total number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

impl TryFrom<RosterData> for Roster {
    type Error = BattleError;

    fn try_from(data: RosterData) -> Result<Self> {
        Self::new(data.statuses)
    }
}

impl From<Roster> for RosterData {
    fn from(roster: Roster) -> Self {
        Self {
            statuses: roster
                .statuses
                .iter()
                .map(|s| Status::clone(s))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_by_identity() {
        let a = Status::new(Side::Player, 1, "archer", 76, 78, 40, 50);
        let b = Status::new(Side::Player, 1, "impostor", 1, 1, 1, 1);
        let c = Status::new(Side::Monster, 1, "archer", 76, 78, 40, 50);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_only_player_observable() {
        assert!(Side::Player.is_observable());
        assert!(!Side::Monster.is_observable());
    }

    #[test]
    fn test_standard_roster() {
        let roster = Roster::standard();
        assert_eq!(roster.len(), 6);
        assert_eq!(roster.count(Side::Player), 3);
        assert_eq!(roster.count(Side::Monster), 3);

        let guardian = roster.get(Side::Monster, 1).unwrap();
        assert_eq!(guardian.name, "guardian");
        assert_eq!(guardian.attack, 122);
        assert_eq!(guardian.to_string(), "guardian");
    }

    #[test]
    fn test_get_shares_template() {
        let roster = Roster::standard();
        let a = roster.get(Side::Player, 0).unwrap();
        let b = roster.get(Side::Player, 0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unknown_status() {
        let roster = Roster::standard();
        assert_eq!(
            roster.get(Side::Monster, 9).unwrap_err(),
            BattleError::UnknownStatus {
                side: Side::Monster,
                id: 9
            }
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = Roster::new(vec![
            Status::new(Side::Player, 0, "a", 1, 1, 1, 1),
            Status::new(Side::Player, 0, "b", 2, 2, 2, 2),
        ]);
        assert_eq!(
            result.unwrap_err(),
            BattleError::DuplicateStatus {
                side: Side::Player,
                id: 0
            }
        );
    }
}
