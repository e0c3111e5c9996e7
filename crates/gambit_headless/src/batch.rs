//! Batch battle runner.
//!
//! Runs many battles in parallel using rayon. Each battle clones the
//! configured teams and gambits and owns a generator seeded with
//! `seed_start + index`, so results do not depend on the thread count.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Instant;

use gambit_core::battle::{Battle, BattleOutcome, DEFAULT_MAX_TURN};
use gambit_core::error::BattleError;
use gambit_core::gambit::Gambit;
use gambit_core::log::TurnLog;
use gambit_core::rng::{battle_seed, seeded};
use gambit_core::team::Team;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::metrics::{BatchSummary, BattleRecord, WinTally};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario name, for reports
    pub scenario: String,
    /// Number of battles to run
    pub battle_count: u32,
    /// Worker threads (0 = rayon default, 1 = sequential)
    pub parallel: u32,
    /// Starting seed; battle `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Turn bound per battle
    pub max_turn: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Whether to keep per-hit logs in the results
    pub keep_logs: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "standard".to_string(),
            battle_count: 100,
            parallel: 0,
            seed_start: 0,
            max_turn: DEFAULT_MAX_TURN,
            output_dir: PathBuf::from("results"),
            keep_logs: true,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: &str, battle_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            battle_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker thread count
    pub fn with_parallel(mut self, threads: u32) -> Self {
        self.parallel = threads;
        self
    }

    /// Set turn bound
    pub fn with_max_turn(mut self, max_turn: u32) -> Self {
        self.max_turn = max_turn;
        self
    }

    /// Drop per-hit logs, keeping only records and tallies
    pub fn without_logs(mut self) -> Self {
        self.keep_logs = false;
        self
    }
}

/// Error during batch run
#[derive(Debug, Error)]
pub enum BatchError {
    /// A battle rejected its setup. Every battle shares that setup, so the
    /// batch stops.
    #[error("Battle {battle_id} failed: {source}")]
    Battle {
        /// Index of the failing battle.
        battle_id: u64,
        /// Underlying error.
        #[source]
        source: BattleError,
    },
    /// Worker pool could not be built.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Wins per team and timeouts
    pub tally: WinTally,
    /// Individual battle records, in battle order
    pub battles: Vec<BattleRecord>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Every battle's logs concatenated in battle order. Exported separately.
    #[serde(skip)]
    pub logs: Vec<TurnLog>,
}

impl BatchResults {
    /// Save results to JSON file (logs excluded)
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run one battle on fresh copies of `teams` and `gambits`.
pub fn run_single_battle(
    teams: &[Team],
    gambits: &[Gambit],
    battle_id: u64,
    seed: u64,
    max_turn: u32,
) -> Result<(BattleRecord, Vec<TurnLog>), BatchError> {
    let mut teams = teams.to_vec();
    let mut gambits = gambits.to_vec();
    let mut logs = Vec::new();
    let mut rng = seeded(seed);

    let outcome = Battle::new(battle_id)
        .simulate(&mut teams, &mut gambits, &mut logs, &mut rng, max_turn)
        .map_err(|source| BatchError::Battle { battle_id, source })?;

    Ok((BattleRecord::from_logs(battle_id, seed, outcome, &logs), logs))
}

/// Run `config.battle_count` battles of `teams` driven by `gambits`.
///
/// `gambits[i]` plays team `i`. The first battle that fails aborts the batch.
pub fn run_batch(
    teams: &[Team],
    gambits: &[Gambit],
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start = Instant::now();

    info!(
        "Starting batch run: {} battles of '{}'",
        config.battle_count, config.scenario
    );

    let run = |i: u32| {
        let battle_id = u64::from(i);
        let seed = battle_seed(config.seed_start, battle_id);
        let result = run_single_battle(teams, gambits, battle_id, seed, config.max_turn);
        if let Ok((record, _)) = &result {
            debug!(battle_id, seed, outcome = %record.outcome, "Battle finished");
        }
        result
    };

    let results: Vec<(BattleRecord, Vec<TurnLog>)> = match config.parallel {
        1 => (0..config.battle_count).map(run).collect::<Result<_, _>>()?,
        0 => (0..config.battle_count)
            .into_par_iter()
            .map(run)
            .collect::<Result<_, _>>()?,
        threads => rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .build()?
            .install(|| {
                (0..config.battle_count)
                    .into_par_iter()
                    .map(run)
                    .collect::<Result<_, _>>()
            })?,
    };

    let mut battles = Vec::with_capacity(results.len());
    let mut logs = Vec::new();
    for (record, battle_logs) in results {
        battles.push(record);
        if config.keep_logs {
            logs.extend(battle_logs);
        }
    }

    let tally: WinTally = battles.iter().map(|r| r.outcome).collect();
    let summary = BatchSummary::from_records(&battles);
    let duration = start.elapsed();

    info!(
        "Batch complete: {} battles in {:.2}s ({:.1} battles/sec)",
        tally.total(),
        duration.as_secs_f64(),
        f64::from(tally.total()) / duration.as_secs_f64().max(f64::EPSILON)
    );

    Ok(BatchResults {
        config: config.clone(),
        tally,
        battles,
        summary,
        duration_seconds: duration.as_secs_f64(),
        logs,
    })
}

/// Replay one seed `runs` times and check that outcome and logs match.
pub fn verify_determinism(
    teams: &[Team],
    gambits: &[Gambit],
    seed: u64,
    runs: u32,
    max_turn: u32,
) -> Result<bool, BatchError> {
    let mut hashes = Vec::with_capacity(runs as usize);
    for _ in 0..runs {
        let (record, logs) = run_single_battle(teams, gambits, 0, seed, max_turn)?;
        hashes.push(hash_battle(record.outcome, &logs));
    }
    Ok(hashes.windows(2).all(|w| w[0] == w[1]))
}

/// Hash of an outcome and its logs.
#[must_use]
pub fn hash_battle(outcome: BattleOutcome, logs: &[TurnLog]) -> u64 {
    let mut hasher = DefaultHasher::new();
    outcome.hash(&mut hasher);
    logs.hash(&mut hasher);
    hasher.finish()
}
