//! Error types for the battle engine.
//!
//! Every variant is a precondition violation. Running out of turns is not an
//! error; see [`crate::battle::BattleOutcome::Timeout`].

use thiserror::Error;

use crate::status::{Side, StatusId};
use crate::team::TeamId;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for all battle engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// A team was constructed without units.
    #[error("Team {team} has no units")]
    EmptyTeam {
        /// Offending team.
        team: TeamId,
    },

    /// A battle was started without any team.
    #[error("Battle requires at least one team")]
    NoTeams,

    /// Team ids must match their position in the team list.
    #[error("Team at index {index} has id {id}")]
    TeamIdMismatch {
        /// Position in the team list.
        index: usize,
        /// Id carried by the team.
        id: TeamId,
    },

    /// Every team needs exactly one gambit.
    #[error("Got {gambits} gambits for {teams} teams")]
    GambitCountMismatch {
        /// Number of teams.
        teams: usize,
        /// Number of gambits.
        gambits: usize,
    },

    /// A gambit was asked to act for a unit with no legal target.
    #[error("Unit {team}:{slot} has no legal target")]
    NoLegalTarget {
        /// Team of the acting unit.
        team: TeamId,
        /// Slot of the acting unit.
        slot: usize,
    },

    /// A gambit was asked to act without any available command.
    #[error("No command available")]
    NoCommand,

    /// A selection referenced a unit that does not exist.
    #[error("Unit not found: {team}:{slot}")]
    UnitNotFound {
        /// Team of the missing unit.
        team: TeamId,
        /// Slot of the missing unit.
        slot: usize,
    },

    /// Two templates share the same identity.
    #[error("Duplicate status {side:?}#{id}")]
    DuplicateStatus {
        /// Side of the duplicate.
        side: Side,
        /// Id of the duplicate.
        id: StatusId,
    },

    /// A template lookup failed.
    #[error("Unknown status {side:?}#{id}")]
    UnknownStatus {
        /// Requested side.
        side: Side,
        /// Requested id.
        id: StatusId,
    },
}
