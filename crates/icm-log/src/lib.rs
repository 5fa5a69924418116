//! Event log ingestion.
//!
//! Reads JSON or XES event logs from a single file or a directory of files
//! and converts them into [`icm_core::Trace`]s.

mod json;
mod xes;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use icm_core::Trace;
use rayon::prelude::*;
use thiserror::Error;

pub use json::parse_json_log;
pub use xes::parse_xes_log;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("log not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid log JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid XES: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XES document has no <log> element")]
    MissingLogElement,
}

/// Parses an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC.
pub(crate) fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn is_xes(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xes"))
}

/// Reads a single log file: XES for a `.xes` extension, JSON otherwise.
pub fn read_log_file(path: &Path, max_traces: usize) -> Result<Vec<Trace>, LogError> {
    let data = fs::read_to_string(path)?;
    if is_xes(path) {
        parse_xes_log(&data, max_traces)
    } else {
        parse_json_log(&data, max_traces)
    }
}

/// `*.json` and `*.xes` files directly inside `dir`, sorted by name.
fn log_files(dir: &Path) -> Result<Vec<PathBuf>, LogError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && (is_xes(&path) || path.extension().is_some_and(|ext| ext == "json")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads a log from a file or a directory of `*.json` and `*.xes` files.
///
/// A single file that cannot be read or parsed is an error. Directory files
/// are parsed in parallel and any that fail are skipped with a warning.
/// Traces keep file order and are capped at `max_traces` overall.
pub fn load_log(path: &Path, max_traces: usize) -> Result<Vec<Trace>, LogError> {
    if !path.exists() {
        return Err(LogError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return read_log_file(path, max_traces);
    }

    let files = log_files(path)?;
    tracing::debug!(dir = ?path, files = files.len(), "loading log directory");

    let per_file: Vec<Vec<Trace>> = files
        .par_iter()
        .filter_map(|file| match read_log_file(file, max_traces) {
            Ok(traces) => Some(traces),
            Err(e) => {
                tracing::warn!(path = ?file, error = %e, "skipping unreadable log file");
                None
            }
        })
        .collect();

    let mut traces: Vec<Trace> = per_file.into_iter().flatten().collect();
    traces.truncate(max_traces);
    Ok(traces)
}
