//! Per-action battle records.
//!
//! A [`TurnLog`] is written for every executed hit and never changed
//! afterwards. Stats of units on a non-observable side are left out, so the
//! log only carries what the player could actually see. Downstream
//! priority estimators are trained on exactly this view.

use serde::{Deserialize, Serialize};

use crate::command::CommandKind;
use crate::status::{Side, StatusId};
use crate::unit::Unit;

/// Stats of one unit as seen by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSnapshot {
    /// Current life.
    pub hp: u32,
    /// Attack power.
    pub atk: u32,
    /// Defence power.
    pub def: u32,
    /// Speed.
    pub spd: u32,
}

impl StatSnapshot {
    /// Snapshot `unit` if its side is observable.
    #[must_use]
    pub fn observe(unit: &Unit) -> Option<Self> {
        unit.side().is_observable().then(|| Self {
            hp: unit.current_life(),
            atk: unit.attack(),
            def: unit.defence(),
            spd: unit.speed(),
        })
    }
}

/// Immutable record of one executed attack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnLog {
    /// Turn number, starting at 1.
    pub turn_id: u32,
    /// Position of the source in the turn's acting order.
    pub order: u32,
    /// Executed command.
    pub command: CommandKind,
    /// Template id of the source.
    pub source_id: StatusId,
    /// Side of the source.
    pub source_side: Side,
    /// Source life when acting.
    pub source_hp: Option<u32>,
    /// Source attack.
    pub source_atk: Option<u32>,
    /// Source defence.
    pub source_def: Option<u32>,
    /// Source speed.
    pub source_spd: Option<u32>,
    /// Template id of the target.
    pub target_id: StatusId,
    /// Side of the target.
    pub target_side: Side,
    /// Target life after the hit.
    pub target_hp: Option<u32>,
    /// Target attack.
    pub target_atk: Option<u32>,
    /// Target defence.
    pub target_def: Option<u32>,
    /// Target speed.
    pub target_spd: Option<u32>,
    /// Sampled damage.
    pub damage: u32,
    /// Damage taken by the target this battle, this hit included.
    pub damage_cumsum: u32,
    /// Whether this hit brought the target to zero life.
    pub defeated: bool,
}

impl TurnLog {
    /// Whether the player can see the source's stats.
    #[must_use]
    pub fn source_observable(&self) -> bool {
        self.source_side.is_observable()
    }

    /// Whether the player can see the target's stats.
    #[must_use]
    pub fn target_observable(&self) -> bool {
        self.target_side.is_observable()
    }
}

/// Inputs to [`TurnLog::new`] besides the two snapshots.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HitRecord {
    pub turn_id: u32,
    pub order: u32,
    pub command: CommandKind,
    pub source_id: StatusId,
    pub source_side: Side,
    pub target_id: StatusId,
    pub target_side: Side,
    pub damage: u32,
    pub damage_cumsum: u32,
    pub defeated: bool,
}

impl TurnLog {
    pub(crate) fn new(
        hit: HitRecord,
        source: Option<StatSnapshot>,
        target: Option<StatSnapshot>,
    ) -> Self {
        Self {
            turn_id: hit.turn_id,
            order: hit.order,
            command: hit.command,
            source_id: hit.source_id,
            source_side: hit.source_side,
            source_hp: source.map(|s| s.hp),
            source_atk: source.map(|s| s.atk),
            source_def: source.map(|s| s.def),
            source_spd: source.map(|s| s.spd),
            target_id: hit.target_id,
            target_side: hit.target_side,
            target_hp: target.map(|s| s.hp),
            target_atk: target.map(|s| s.atk),
            target_def: target.map(|s| s.def),
            target_spd: target.map(|s| s.spd),
            damage: hit.damage,
            damage_cumsum: hit.damage_cumsum,
            defeated: hit.defeated,
        }
    }
}
