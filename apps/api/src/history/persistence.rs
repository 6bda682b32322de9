//! On-disk history format: a tagged, versioned JSON envelope.
//!
//! ```json
//! { "format": "smartresume-history", "version": 1, "saved_at": "...", "entries": [...] }
//! ```
//!
//! Saves write a temp file next to the target and rename it into place, so a failed
//! save never leaves a half-written history behind.

use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::history::{HistoryEntry, HistoryError, TIMESTAMP_FORMAT};

pub const FORMAT_TAG: &str = "smartresume-history";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct HistoryFileRef<'a> {
    format: &'a str,
    version: u32,
    saved_at: String,
    entries: &'a [HistoryEntry],
}

/// Header read first so foreign files fail on the tag/version, not on entry fields.
#[derive(Deserialize)]
struct HistoryHeader {
    format: String,
    version: u32,
}

#[derive(Deserialize)]
struct HistoryFile {
    entries: Vec<HistoryEntry>,
}

/// Writes `entries` to `path`, replacing whatever was there.
pub fn write_history(path: &Path, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file = HistoryFileRef {
        format: FORMAT_TAG,
        version: FORMAT_VERSION,
        saved_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        entries,
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, &file).map_err(io::Error::from)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!(
        "Saved {} history entries to {}",
        entries.len(),
        path.display()
    );
    Ok(())
}

/// Reads a history file written by `write_history`.
pub fn read_history(path: &Path) -> Result<Vec<HistoryEntry>, HistoryError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(HistoryError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(HistoryError::Io(e)),
    };

    let header: HistoryHeader = serde_json::from_slice(&bytes)
        .map_err(|e| HistoryError::Deserialization(format!("not a history file: {e}")))?;

    if header.format != FORMAT_TAG {
        return Err(HistoryError::Deserialization(format!(
            "unexpected format tag '{}'",
            header.format
        )));
    }
    if header.version != FORMAT_VERSION {
        return Err(HistoryError::Deserialization(format!(
            "unsupported history version {} (expected {FORMAT_VERSION})",
            header.version
        )));
    }

    let file: HistoryFile = serde_json::from_slice(&bytes)
        .map_err(|e| HistoryError::Deserialization(format!("invalid entries: {e}")))?;

    if let Some((index, entry)) = file
        .entries
        .iter()
        .enumerate()
        .find(|(_, e)| !e.has_valid_score())
    {
        return Err(HistoryError::Deserialization(format!(
            "entry {} has an invalid match percentage {}",
            index + 1,
            entry.match_percentage
        )));
    }

    info!(
        "Loaded {} history entries from {}",
        file.entries.len(),
        path.display()
    );
    Ok(file.entries)
}
