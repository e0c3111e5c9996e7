//! # Gambit Core
//!
//! Turn-based battle engine: teams of units trade attacks until one side is
//! wiped out or the turn bound runs out.
//!
//! This crate contains **only** simulation logic:
//! - No IO
//! - No global randomness (every draw goes through a caller-supplied RNG)
//! - No threads
//!
//! A battle seeded with the same value replays exactly, logs included.
//!
//! ## Crate Structure
//!
//! - [`status`] - Unit templates and rosters
//! - [`unit`] - Combatant instances
//! - [`team`] - Groups of units sharing a side of the fight
//! - [`command`] - Executable actions and damage rolls
//! - [`gambit`] - Decision strategies
//! - [`log`] - Per-hit battle records
//! - [`turn`] - One round of actions
//! - [`battle`] - Full encounters
//! - [`rng`] - Seeded random streams

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod command;
pub mod error;
pub mod gambit;
pub mod log;
pub mod rng;
pub mod status;
pub mod team;
pub mod turn;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{Battle, BattleOutcome, DEFAULT_MAX_TURN, TIMEOUT_CODE};
    pub use crate::command::{estimate_damage, Command, CommandKind, TargetScope};
    pub use crate::error::{BattleError, Result};
    pub use crate::gambit::{
        estimate_priority, Gambit, GambitKind, LearnedGambit, PriorityRanker, RankEstimate,
        Selection, TemplateRanker,
    };
    pub use crate::log::{StatSnapshot, TurnLog};
    pub use crate::rng::{battle_seed, seeded, BattleRng};
    pub use crate::status::{Roster, Side, Status, StatusId};
    pub use crate::team::{Team, TeamId};
    pub use crate::turn::{Turn, TurnResult};
    pub use crate::unit::{Unit, UnitKey};
}
