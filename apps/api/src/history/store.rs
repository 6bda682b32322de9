use std::io;
use std::path::{Path, PathBuf};

use crate::history::persistence::{read_history, write_history};
use crate::history::{HistoryEntry, HistoryError};

/// In-memory evaluation history for one session.
///
/// Owned by the application state. Created empty at startup, cleared by `reset`,
/// and replaced wholesale by `load`.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Writes a snapshot of the entries to `path` on the blocking pool.
    pub async fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let entries = self.entries.clone();
        let path = path.to_path_buf();
        on_blocking_pool(move || write_history(&path, &entries)).await
    }

    /// Replaces the current entries with the saved ones. On error nothing changes.
    pub async fn load(&mut self, path: &Path) -> Result<usize, HistoryError> {
        let path: PathBuf = path.to_path_buf();
        self.entries = on_blocking_pool(move || read_history(&path)).await?;
        Ok(self.entries.len())
    }

    /// Plain-text export, one block per evaluation.
    pub fn export_text(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "Evaluation {} - {}\nJD Match: {}\nMissing Keywords: {}\n\n",
                    i + 1,
                    entry.timestamp,
                    entry.match_display(),
                    entry.missing_keywords.join(", ")
                )
            })
            .collect()
    }
}

async fn on_blocking_pool<T, F>(task: F) -> Result<T, HistoryError>
where
    F: FnOnce() -> Result<T, HistoryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| HistoryError::Io(io::Error::other(format!("history file task failed: {e}"))))?
}
