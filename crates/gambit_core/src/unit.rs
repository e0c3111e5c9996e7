//! Per-battle combat state.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::status::{Side, Status, StatusId};
use crate::team::TeamId;

/// Lower bound of the monster life roll.
pub const MONSTER_LIFE_MIN_FACTOR: f64 = 0.85;

/// Upper bound of the monster life roll.
pub const MONSTER_LIFE_MAX_FACTOR: f64 = 1.0;

/// Lower bound of the speed multiplier used for turn order.
pub const PRIORITY_MIN_FACTOR: f64 = 0.5;

/// Upper bound of the speed multiplier used for turn order.
pub const PRIORITY_MAX_FACTOR: f64 = 1.0;

/// Identity of a unit inside one battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    /// Owning team.
    pub team: TeamId,
    /// Position in the team.
    pub slot: usize,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.team, self.slot)
    }
}

/// A status instantiated into a battle.
///
/// Invariant: `current_life <= max_life`.
#[derive(Debug, Clone)]
pub struct Unit {
    status: Arc<Status>,
    pub(crate) slot_index: usize,
    pub(crate) team_id: TeamId,
    current_life: u32,
    max_life: u32,
}

impl Unit {
    /// Create a unit at full template life.
    ///
    /// Team and slot are assigned when the unit joins a [`crate::team::Team`].
    #[must_use]
    pub fn new(status: Arc<Status>) -> Self {
        let life = status.life;
        Self {
            status,
            slot_index: 0,
            team_id: TeamId::default(),
            current_life: life,
            max_life: life,
        }
    }

    /// Re-roll maximum life and heal to full.
    ///
    /// Monsters get `floor(uniform(0.85, 1.0) * life)`, players keep their
    /// template life.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.max_life = match self.side() {
            Side::Monster => {
                let factor = rng.gen_range(MONSTER_LIFE_MIN_FACTOR..MONSTER_LIFE_MAX_FACTOR);
                (factor * f64::from(self.status.life)) as u32
            }
            Side::Player => self.status.life,
        };
        self.current_life = self.max_life;
    }

    /// Draw this turn's action priority: `speed * uniform(0.5, 1.0)`.
    ///
    /// Never cached; every call consumes a fresh draw.
    pub fn calc_action_priority<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let factor = rng.gen_range(PRIORITY_MIN_FACTOR..PRIORITY_MAX_FACTOR);
        f64::from(self.speed()) * factor
    }

    /// Apply damage, returning the life actually lost.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current_life);
        self.current_life -= actual;
        actual
    }

    /// Whether the unit can still act.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_life > 0
    }

    /// Whether `other` fights for a different team.
    #[must_use]
    pub fn is_adversarial(&self, other: &Unit) -> bool {
        self.team_id != other.team_id
    }

    /// Whether `other` is a legal attack target.
    #[must_use]
    pub fn can_attack(&self, other: &Unit) -> bool {
        other.is_alive() && self.is_adversarial(other)
    }

    /// Identity inside the battle.
    #[must_use]
    pub const fn key(&self) -> UnitKey {
        UnitKey {
            team: self.team_id,
            slot: self.slot_index,
        }
    }

    /// Template.
    #[must_use]
    pub fn status(&self) -> &Arc<Status> {
        &self.status
    }

    /// Template id.
    #[must_use]
    pub fn id(&self) -> StatusId {
        self.status.id
    }

    /// Template side.
    #[must_use]
    pub fn side(&self) -> Side {
        self.status.side
    }

    /// Attack power.
    #[must_use]
    pub fn attack(&self) -> u32 {
        self.status.attack
    }

    /// Defence power.
    #[must_use]
    pub fn defence(&self) -> u32 {
        self.status.defence
    }

    /// Speed.
    #[must_use]
    pub fn speed(&self) -> u32 {
        self.status.speed
    }

    /// Owning team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Position in the owning team.
    #[must_use]
    pub const fn slot_index(&self) -> usize {
        self.slot_index
    }

    /// Remaining life.
    #[must_use]
    pub const fn current_life(&self) -> u32 {
        self.current_life
    }

    /// Life after the last reset.
    #[must_use]
    pub const fn max_life(&self) -> u32 {
        self.max_life
    }

    /// Damage taken since the last reset.
    #[must_use]
    pub const fn damage_taken(&self) -> u32 {
        self.max_life - self.current_life
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.status.name, self.team_id)
    }
}
