//! Determinism testing utilities.
//!
//! A battle seeded with the same value must produce the same outcome and
//! byte-for-byte the same logs, regardless of how many other battles ran
//! before it or on which thread.
//!
//! Sources of non-determinism to watch for:
//!
//! - **Shared RNG streams**: every battle owns its generator, derived from
//!   `seed_start + index`.
//! - **HashMap iteration order**: candidates and turn order are always built
//!   from team/slot order.
//! - **Unstable sorting**: exact priority ties keep input order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use gambit_core::battle::{Battle, BattleOutcome};
use gambit_core::gambit::Gambit;
use gambit_core::log::TurnLog;
use gambit_core::rng::seeded;
use gambit_core::team::Team;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hash of outcome and logs from each run.
    pub hashes: Vec<u64>,
    /// Seed used for every run.
    pub seed: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Seed: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.seed,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run one battle from fresh teams and gambits.
///
/// # Panics
///
/// Panics if the battle rejects its setup.
pub fn run_battle<Setup>(setup: &Setup, seed: u64, max_turn: u32) -> (BattleOutcome, Vec<TurnLog>)
where
    Setup: Fn() -> (Vec<Team>, Vec<Gambit>),
{
    let (mut teams, mut gambits) = setup();
    let mut logs = Vec::new();
    let outcome = Battle::new(seed)
        .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(seed), max_turn)
        .expect("valid battle setup");
    (outcome, logs)
}

/// Run the same seeded battle `runs` times and compare the results.
///
/// # Example
///
/// ```ignore
/// use gambit_test_utils::determinism::verify_determinism;
/// use gambit_test_utils::fixtures::{standard_gambits, standard_teams};
///
/// let result = verify_determinism(5, 42, 1000, || (standard_teams(), standard_gambits()));
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<Setup>(
    runs: usize,
    seed: u64,
    max_turn: u32,
    setup: Setup,
) -> DeterminismResult
where
    Setup: Fn() -> (Vec<Team>, Vec<Gambit>),
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let (outcome, logs) = run_battle(&setup, seed, max_turn);
            compute_hash(&(outcome, logs))
        })
        .collect();

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        tracing::warn!(seed, runs, "Battle diverged across runs");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        seed,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle inputs.
pub mod strategies {
    use proptest::prelude::*;

    use gambit_core::gambit::GambitKind;
    use gambit_core::status::{Side, Status};

    /// Generate a side.
    pub fn arb_side() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Player), Just(Side::Monster)]
    }

    /// Generate a built-in gambit kind.
    pub fn arb_gambit_kind() -> impl Strategy<Value = GambitKind> {
        prop_oneof![Just(GambitKind::Naive), Just(GambitKind::Cunning)]
    }

    /// Generate a template with stats in the range of the standard roster.
    pub fn arb_status(side: Side, id: u32) -> impl Strategy<Value = Status> {
        (1u32..200, 0u32..150, 0u32..100, 1u32..100).prop_map(
            move |(life, attack, defence, speed)| {
                Status::new(side, id, format!("s{id}"), life, attack, defence, speed)
            },
        )
    }

    /// Generate 1 to `max` templates of one side with ids `0..n`.
    pub fn arb_side_statuses(side: Side, max: usize) -> impl Strategy<Value = Vec<Status>> {
        (1..=max).prop_flat_map(move |n| {
            (0..n)
                .map(|id| arb_status(side, id as u32))
                .collect::<Vec<_>>()
        })
    }

    /// Generate a seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
