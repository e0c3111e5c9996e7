//! Roster data loading.
//!
//! Loads unit templates from RON files so batches can run against rosters
//! other than the built-in one. A roster file looks like:
//!
//! ```ron
//! (
//!     statuses: [
//!         (side: Player, id: 0, name: "knight", life: 104, attack: 65, defence: 65, speed: 32),
//!         (side: Monster, id: 0, name: "devil", life: 71, attack: 54, defence: 24, speed: 38),
//!     ],
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use gambit_core::error::BattleError;
use gambit_core::status::{Roster, Status};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during roster loading.
#[derive(Debug, Error)]
pub enum RosterLoadError {
    /// Failed to read a file or directory.
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse RON.
    #[error("Parse error in '{path}': {source}")]
    Parse {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: ron::error::SpannedError,
    },
    /// The file parsed but holds an invalid roster.
    #[error("Invalid roster in '{path}': {source}")]
    Invalid {
        /// Offending path.
        path: String,
        /// Underlying error.
        #[source]
        source: BattleError,
    },
    /// Directory not found.
    #[error("Roster directory not found: {0}")]
    DirectoryNotFound(String),
}

/// On-disk layout. Parsed apart from [`Roster`] so duplicate templates keep
/// their typed error.
#[derive(Deserialize)]
struct RosterFile {
    statuses: Vec<Status>,
}

/// Load a roster from a RON file.
pub fn load_roster(path: &Path) -> Result<Roster, RosterLoadError> {
    let content = fs::read_to_string(path).map_err(|source| RosterLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_roster(&content, path)
}

fn parse_roster(content: &str, path: &Path) -> Result<Roster, RosterLoadError> {
    let data: RosterFile = ron::from_str(content).map_err(|source| RosterLoadError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Roster::new(data.statuses).map_err(|source| RosterLoadError::Invalid {
        path: path.display().to_string(),
        source,
    })
}

/// Merge every `.ron` roster in `dir`, in file name order.
///
/// Unreadable files and templates that clash with an earlier file are
/// skipped with a warning.
pub fn load_roster_dir(dir: &Path) -> Result<Roster, RosterLoadError> {
    if !dir.exists() {
        return Err(RosterLoadError::DirectoryNotFound(dir.display().to_string()));
    }

    let io_err = |source| RosterLoadError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    paths.retain(|p| p.extension().is_some_and(|e| e == "ron"));
    paths.sort();

    let mut roster = Roster::default();
    for path in paths {
        let loaded = match load_roster(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to load roster from {:?}: {}", path, e);
                continue;
            }
        };
        for status in loaded.statuses() {
            if let Err(e) = roster.insert(Status::clone(status)) {
                warn!("Skipping template from {:?}: {}", path, e);
            }
        }
        debug!(path = %path.display(), total = roster.len(), "Loaded roster file");
    }

    Ok(roster)
}

/// Directory holding the bundled data files.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}
