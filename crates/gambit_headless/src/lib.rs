//! Headless battle driver.
//!
//! Runs many battles of a scenario and reports who won. This enables:
//!
//! - **Strategy comparison**: win rates of one gambit against another
//! - **Data generation**: exported turn logs for training priority estimators
//! - **Determinism checks**: replaying a seed must reproduce the same logs
//!
//! # Example
//!
//! ```bash
//! # Naive vs cunning player win rates on the standard scenario
//! cargo run -p gambit_headless -- compare --count 1000
//!
//! # 10k battles, logs written as JSON Lines
//! cargo run -p gambit_headless -- batch --count 10000 --output results/
//!
//! # Verify a seed replays identically
//! cargo run -p gambit_headless -- verify --seed 42 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod export;
pub mod metrics;
pub mod roster_loader;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchError, BatchResults};
pub use export::{read_logs, write_logs, ExportError, LogFormat};
pub use metrics::{BatchSummary, BattleRecord, WinTally};
pub use roster_loader::{default_data_dir, load_roster, load_roster_dir, RosterLoadError};
pub use scenario::{Scenario, ScenarioError, TeamSetup};
