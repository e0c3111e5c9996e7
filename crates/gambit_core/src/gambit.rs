//! Decision strategies.
//!
//! A [`Gambit`] picks a command and its targets for an acting unit. All
//! variants share one contract:
//!
//! - `candidates` holds every unit in the battle, both sides, dead or alive.
//!   Narrowing to legal targets is the command's job
//!   ([`Command::targets`]), not the gambit's.
//! - The returned [`Selection`] carries exactly the targets the command
//!   should resolve against.
//! - An empty legal target set is a precondition violation
//!   ([`BattleError::NoLegalTarget`]); the turn loop never asks a unit to act
//!   without a living enemy.
//!
//! # Variants
//!
//! - [`Gambit::Naive`]: uniform random target.
//! - [`Gambit::Cunning`]: full-information greedy heuristic.
//! - [`Gambit::Learned`]: the same heuristic fed by an external
//!   [`PriorityRanker`] instead of the true stats.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::command::{estimate_damage, Command};
use crate::error::{BattleError, Result};
use crate::status::{Roster, Side, StatusId};
use crate::team::Team;
use crate::unit::{Unit, UnitKey};

/// A chosen command and the units it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Command to execute.
    pub command: Command,
    /// Targets, already narrowed to the intended count.
    pub targets: Vec<UnitKey>,
}

/// Configuration tag for the gambits that need no external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GambitKind {
    /// Random target.
    Naive,
    /// Full-information heuristic.
    Cunning,
}

impl GambitKind {
    /// Build the gambit.
    #[must_use]
    pub fn build(self) -> Gambit {
        match self {
            GambitKind::Naive => Gambit::Naive,
            GambitKind::Cunning => Gambit::Cunning,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GambitKind::Naive => "naive",
            GambitKind::Cunning => "cunning",
        }
    }
}

impl fmt::Display for GambitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for GambitKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" | "random" => Ok(GambitKind::Naive),
            "cunning" | "cheat" => Ok(GambitKind::Cunning),
            other => Err(format!("unknown gambit '{other}' (expected naive or cunning)")),
        }
    }
}

/// Decision strategy of a team.
#[derive(Debug, Clone)]
pub enum Gambit {
    /// Pick a random legal target.
    Naive,
    /// Pick the target with the best damage trade, seeing every stat.
    Cunning,
    /// Pick the target with the best estimated damage trade.
    Learned(LearnedGambit),
}

impl Gambit {
    /// Build a learned gambit around a ranker.
    pub fn learned(ranker: impl PriorityRanker + 'static) -> Self {
        Gambit::Learned(LearnedGambit::new(Arc::new(ranker)))
    }

    /// Prepare for a new battle.
    pub fn reset(&mut self, teams: &[Team]) {
        match self {
            Gambit::Naive | Gambit::Cunning => {}
            Gambit::Learned(learned) => learned.reset(teams),
        }
    }

    /// Choose a command and its targets for `source`.
    pub fn select_command<R: Rng + ?Sized>(
        &mut self,
        source: &Unit,
        candidates: &[&Unit],
        commands: &[Command],
        rng: &mut R,
    ) -> Result<Selection> {
        // Only one command exists, so every variant takes the first.
        let command = *commands.first().ok_or(BattleError::NoCommand)?;
        let targets = command.targets(source, candidates);
        if targets.is_empty() {
            return Err(BattleError::NoLegalTarget {
                team: source.team_id(),
                slot: source.slot_index(),
            });
        }

        let chosen = match self {
            Gambit::Naive => targets.choose(rng).copied(),
            Gambit::Cunning => pick_highest(&targets, |t| estimate_priority(source, t)),
            Gambit::Learned(learned) => {
                pick_highest(&targets, |t| learned.estimate_priority(source, t))
            }
        };

        Ok(Selection {
            command,
            targets: chosen.map(Unit::key).into_iter().collect(),
        })
    }

    /// Short name for logs and reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Gambit::Naive => "naive",
            Gambit::Cunning => "cunning",
            Gambit::Learned(_) => "learned",
        }
    }
}

impl From<GambitKind> for Gambit {
    fn from(kind: GambitKind) -> Self {
        kind.build()
    }
}

/// Highest-priority target; ties go to the later candidate.
fn pick_highest<'a>(
    targets: &[&'a Unit],
    mut priority: impl FnMut(&Unit) -> f64,
) -> Option<&'a Unit> {
    targets
        .iter()
        .map(|&t| (t, priority(t)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(t, _)| t)
}

/// Full-information priority of attacking `target` with `source`.
///
/// `taken / target template life * given`. The denominator is the template
/// life, not the rolled maximum: decisions are based on designed strength.
#[must_use]
pub fn estimate_priority(source: &Unit, target: &Unit) -> f64 {
    let damage_taken = estimate_damage(target.attack(), source.defence());
    let damage_given = estimate_damage(source.attack(), target.defence());
    f64::from(damage_taken) / f64::from(target.status().life) * f64::from(damage_given)
}

/// Estimates consumed by [`Gambit::Learned`] for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankEstimate {
    /// Damage the source expects to take from the target per hit.
    pub damage_taken: f64,
    /// Damage the source expects to deal to the target per hit.
    pub damage_given: f64,
    /// Expected maximum life of the target.
    pub max_hp: f64,
}

impl RankEstimate {
    /// `damage_taken / max_hp * damage_given`.
    #[must_use]
    pub fn priority(&self) -> f64 {
        self.damage_taken / self.max_hp * self.damage_given
    }
}

/// External estimator behind [`Gambit::Learned`].
///
/// Called once per candidate per decision with the source's visible stats
/// and the target's template id. Must be pure from the engine's point of
/// view: same inputs, same estimate.
pub trait PriorityRanker: Send + Sync {
    /// Estimate the damage trade against target template `target_id`.
    fn rank(&self, source_attack: u32, source_defence: u32, target_id: StatusId) -> RankEstimate;
}

impl<F> PriorityRanker for F
where
    F: Fn(u32, u32, StatusId) -> RankEstimate + Send + Sync,
{
    fn rank(&self, source_attack: u32, source_defence: u32, target_id: StatusId) -> RankEstimate {
        self(source_attack, source_defence, target_id)
    }
}

/// State of a [`Gambit::Learned`]: a shared ranker and a per-battle cache.
#[derive(Clone)]
pub struct LearnedGambit {
    ranker: Arc<dyn PriorityRanker>,
    cache: HashMap<(u32, u32, StatusId), RankEstimate>,
}

impl LearnedGambit {
    /// Wrap a ranker.
    #[must_use]
    pub fn new(ranker: Arc<dyn PriorityRanker>) -> Self {
        Self {
            ranker,
            cache: HashMap::new(),
        }
    }

    /// Drop cached estimates.
    pub fn reset(&mut self, _teams: &[Team]) {
        self.cache.clear();
    }

    /// Estimate via the ranker, caching by input.
    pub fn rank(&mut self, source: &Unit, target: &Unit) -> RankEstimate {
        let key = (source.attack(), source.defence(), target.id());
        let ranker = &self.ranker;
        *self
            .cache
            .entry(key)
            .or_insert_with(|| ranker.rank(key.0, key.1, key.2))
    }

    /// Priority of attacking `target` with `source`.
    pub fn estimate_priority(&mut self, source: &Unit, target: &Unit) -> f64 {
        self.rank(source, target).priority()
    }

    /// Number of cached estimates.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for LearnedGambit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearnedGambit")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Analytic ranker computed from true templates.
///
/// Reproduces [`Gambit::Cunning`] decisions through the learned path.
/// Useful as a reference point when evaluating trained estimators.
#[derive(Debug, Clone)]
pub struct TemplateRanker {
    roster: Roster,
    target_side: Side,
}

impl TemplateRanker {
    /// Rank targets of `target_side` using `roster`.
    #[must_use]
    pub fn new(roster: Roster, target_side: Side) -> Self {
        Self { roster, target_side }
    }
}

impl PriorityRanker for TemplateRanker {
    fn rank(&self, source_attack: u32, source_defence: u32, target_id: StatusId) -> RankEstimate {
        match self.roster.get(self.target_side, target_id) {
            Ok(target) => RankEstimate {
                damage_taken: f64::from(estimate_damage(target.attack, source_defence)),
                damage_given: f64::from(estimate_damage(source_attack, target.defence)),
                max_hp: f64::from(target.life),
            },
            // Unknown targets rank lowest.
            Err(_) => RankEstimate {
                damage_taken: 0.0,
                damage_given: 0.0,
                max_hp: 1.0,
            },
        }
    }
}
