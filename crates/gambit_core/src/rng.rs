//! Seeded random source threaded through the engine.
//!
//! The engine never touches thread-local or OS randomness. Every draw (turn
//! priority, damage roll, monster life roll, naive target pick) goes through
//! an explicit `&mut R where R: Rng + ?Sized`, so a battle replays exactly
//! from its seed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default generator used by drivers and tests.
pub type BattleRng = ChaCha8Rng;

/// Create a generator from a seed.
#[must_use]
pub fn seeded(seed: u64) -> BattleRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Seed for the battle at `index` in a batch starting at `seed_start`.
///
/// Battles get independent streams so they can run on any thread in any
/// order and still produce the same logs.
#[must_use]
pub const fn battle_seed(seed_start: u64, index: u64) -> u64 {
    seed_start.wrapping_add(index)
}
