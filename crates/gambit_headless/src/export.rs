//! Turn log export.
//!
//! JSON Lines is the analysis format: one [`TurnLog`] object per line, in
//! battle order. Bincode is a compact alternative for large batches.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use gambit_core::log::TurnLog;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised while writing or reading exported logs.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON line failed to encode or decode.
    #[error("Invalid JSON on line {line}: {source}")]
    Json {
        /// 1-based line number, 0 when writing.
        line: usize,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Bincode failure.
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// On-disk log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Jsonl,
    /// A single bincode-encoded vector.
    Bincode,
}

impl LogFormat {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            LogFormat::Jsonl => "jsonl",
            LogFormat::Bincode => "bin",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            "bincode" | "bin" => Ok(LogFormat::Bincode),
            other => Err(format!("unknown log format '{other}' (expected jsonl or bincode)")),
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Write logs as JSON Lines.
pub fn write_logs_jsonl(path: &Path, logs: &[TurnLog]) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    for log in logs {
        serde_json::to_writer(&mut writer, log)
            .map_err(|source| ExportError::Json { line: 0, source })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    debug!(path = %path.display(), count = logs.len(), "Wrote JSON Lines logs");
    Ok(())
}

/// Read JSON Lines logs. Blank lines are ignored.
pub fn read_logs_jsonl(path: &Path) -> Result<Vec<TurnLog>, ExportError> {
    let reader = BufReader::new(File::open(path)?);
    let mut logs = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let log = serde_json::from_str(&line).map_err(|source| ExportError::Json {
            line: index + 1,
            source,
        })?;
        logs.push(log);
    }
    Ok(logs)
}

/// Write logs as one bincode vector.
pub fn write_logs_bincode(path: &Path, logs: &[TurnLog]) -> Result<(), ExportError> {
    let mut writer = create(path)?;
    bincode::serialize_into(&mut writer, logs)?;
    writer.flush()?;
    debug!(path = %path.display(), count = logs.len(), "Wrote bincode logs");
    Ok(())
}

/// Read logs written by [`write_logs_bincode`].
pub fn read_logs_bincode(path: &Path) -> Result<Vec<TurnLog>, ExportError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

/// Write logs in `format`.
pub fn write_logs(path: &Path, logs: &[TurnLog], format: LogFormat) -> Result<(), ExportError> {
    match format {
        LogFormat::Jsonl => write_logs_jsonl(path, logs),
        LogFormat::Bincode => write_logs_bincode(path, logs),
    }
}

/// Read logs in `format`.
pub fn read_logs(path: &Path, format: LogFormat) -> Result<Vec<TurnLog>, ExportError> {
    match format {
        LogFormat::Jsonl => read_logs_jsonl(path),
        LogFormat::Bincode => read_logs_bincode(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::battle::Battle;
    use gambit_core::gambit::Gambit;
    use gambit_core::rng::seeded;
    use gambit_test_utils::fixtures::standard_teams;
    use tempfile::TempDir;

    fn sample_logs() -> Vec<TurnLog> {
        let mut teams = standard_teams();
        let mut gambits = vec![Gambit::Cunning, Gambit::Naive];
        let mut logs = Vec::new();
        Battle::new(0)
            .simulate(&mut teams, &mut gambits, &mut logs, &mut seeded(3), 1000)
            .unwrap();
        logs
    }

    #[test]
    fn test_jsonl_one_line_per_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/logs.jsonl");
        let logs = sample_logs();

        write_logs_jsonl(&path, &logs).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), logs.len());
        assert!(text.lines().next().unwrap().contains("\"turn_id\":1"));
        assert_eq!(read_logs_jsonl(&path).unwrap(), logs);
    }

    #[test]
    fn test_jsonl_monster_fields_are_null() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs.jsonl");
        let logs = sample_logs();
        write_logs_jsonl(&path, &logs).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let monster_source = text
            .lines()
            .find(|l| l.contains("\"source_side\":\"Monster\""))
            .unwrap();
        assert!(monster_source.contains("\"source_hp\":null"));
    }

    #[test]
    fn test_jsonl_reports_bad_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs.jsonl");
        write_logs_jsonl(&path, &sample_logs()[..1]).unwrap();
        let mut text = fs::read_to_string(&path).unwrap();
        text.push_str("{not json}\n");
        fs::write(&path, text).unwrap();

        assert!(matches!(
            read_logs_jsonl(&path),
            Err(ExportError::Json { line: 2, .. })
        ));
    }

    #[test]
    fn test_bincode_matches_jsonl() {
        let dir = TempDir::new().unwrap();
        let logs = sample_logs();
        for format in [LogFormat::Jsonl, LogFormat::Bincode] {
            let path = dir.path().join(format!("logs.{}", format.extension()));
            write_logs(&path, &logs, format).unwrap();
            assert_eq!(read_logs(&path, format).unwrap(), logs);
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSONL".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert_eq!("bin".parse::<LogFormat>().unwrap(), LogFormat::Bincode);
        assert!("csv".parse::<LogFormat>().is_err());
    }
}
