//! Scenario loading and configuration.
//!
//! Scenarios describe which templates fight on which team, the gambit each
//! team plays, and the turn bound. Templates are looked up in a [`Roster`]
//! when the teams are built.

use std::path::Path;

use gambit_core::battle::DEFAULT_MAX_TURN;
use gambit_core::error::BattleError;
use gambit_core::gambit::{Gambit, GambitKind};
use gambit_core::status::{Roster, Side, StatusId};
use gambit_core::team::{Team, TeamId};
use gambit_core::unit::Unit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Teams could not be built from the roster.
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] BattleError),
    /// A gambit override named a team that does not exist.
    #[error("No team at index {index} (scenario has {teams})")]
    NoSuchTeam {
        /// Requested team index.
        index: usize,
        /// Number of teams in the scenario.
        teams: usize,
    },
}

/// One team of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSetup {
    /// Display name.
    pub name: String,
    /// Side every template of this team is drawn from.
    pub side: Side,
    /// Template ids, one unit each, in slot order.
    pub units: Vec<StatusId>,
    /// Strategy the team plays.
    pub gambit: GambitKind,
}

impl TeamSetup {
    /// Create a team setup.
    pub fn new(name: impl Into<String>, side: Side, units: Vec<StatusId>, gambit: GambitKind) -> Self {
        Self {
            name: name.into(),
            side,
            units,
            gambit,
        }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Turn bound; turns `1..max_turn` are played.
    #[serde(default = "default_max_turn")]
    pub max_turn: u32,
    /// Teams in id order.
    pub teams: Vec<TeamSetup>,
}

fn default_max_turn() -> u32 {
    DEFAULT_MAX_TURN
}

impl Default for Scenario {
    fn default() -> Self {
        Self::standard()
    }
}

impl Scenario {
    /// Knight, archer and thief against devil, guardian and ogre, both naive.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            description: "knight, archer and thief against devil, guardian and ogre".to_string(),
            max_turn: DEFAULT_MAX_TURN,
            teams: vec![
                TeamSetup::new("players", Side::Player, vec![0, 1, 2], GambitKind::Naive),
                TeamSetup::new("monsters", Side::Monster, vec![0, 1, 2], GambitKind::Naive),
            ],
        }
    }

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Replace the gambit of the team at `index`.
    pub fn with_gambit(mut self, index: usize, gambit: GambitKind) -> Result<Self, ScenarioError> {
        let teams = self.teams.len();
        let setup = self
            .teams
            .get_mut(index)
            .ok_or(ScenarioError::NoSuchTeam { index, teams })?;
        setup.gambit = gambit;
        Ok(self)
    }

    /// Build fresh teams from `roster`. Team ids follow scenario order.
    pub fn build_teams(&self, roster: &Roster) -> Result<Vec<Team>, ScenarioError> {
        if self.teams.is_empty() {
            return Err(BattleError::NoTeams.into());
        }
        self.teams
            .iter()
            .enumerate()
            .map(|(index, setup)| -> Result<Team, ScenarioError> {
                let units = setup
                    .units
                    .iter()
                    .map(|&id| roster.get(setup.side, id).map(Unit::new))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Team::new(TeamId(index as u32), units)?)
            })
            .collect()
    }

    /// One gambit per team, in team order.
    #[must_use]
    pub fn gambits(&self) -> Vec<Gambit> {
        self.teams.iter().map(|t| t.gambit.build()).collect()
    }

    /// Name of the team with `id`, if any.
    #[must_use]
    pub fn team_name(&self, id: TeamId) -> Option<&str> {
        self.teams.get(id.index()).map(|t| t.name.as_str())
    }
}
