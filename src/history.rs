// history.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::storage::Storage;

pub const HISTORY_KEY: &str = "calc_history";
pub const HISTORY_LIMIT: usize = 200;
pub const EXPORT_FILE_NAME: &str = "calculator_history.json";
pub const EXPORT_MIME: &str = "application/json";
pub const CLEAR_PROMPT: &str = "Clear all history?";
pub const EMPTY_PLACEHOLDER: &str = "No history";

/// One past calculation. `result` keeps the exact display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: impl Into<String>, time: i64) -> Self {
        Self { expression: expression.into(), result: result.into(), time }
    }

    pub fn now(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self::new(expression, result, chrono::Utc::now().timestamp_millis())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    /// Position in the snapshot this view was built from.
    pub index: usize,
    pub expression: String,
    pub result: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    Empty,
    Entries(Vec<RenderedEntry>),
}

impl HistoryView {
    pub fn len(&self) -> usize {
        match self {
            HistoryView::Empty => 0,
            HistoryView::Entries(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Newest-first, capped history kept whole under a single storage key.
/// Nothing is cached: every call re-reads the stored snapshot.
pub struct HistoryManager<S: Storage> {
    storage: S,
}

impl<S: Storage> HistoryManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let raw = self
            .storage
            .get_item(HISTORY_KEY)
            .map_err(HistoryError::StorageReadFailure)?;
        match raw {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Vec::new()),
        }
    }

    pub fn try_record(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self.load()?;
        entries.insert(0, entry);
        entries.truncate(HISTORY_LIMIT);
        let text = serde_json::to_string(&entries)?;
        self.storage
            .set_item(HISTORY_KEY, &text)
            .map_err(HistoryError::StorageWriteFailure)
    }

    /// Best effort: failures are logged and dropped.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        match self.try_record(entry) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("history not saved: {e}");
                false
            }
        }
    }

    pub fn render(&self) -> HistoryView {
        let entries = match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot read history: {e}");
                Vec::new()
            }
        };
        if entries.is_empty() {
            return HistoryView::Empty;
        }
        HistoryView::Entries(
            entries
                .into_iter()
                .enumerate()
                .map(|(index, h)| RenderedEntry {
                    index,
                    expression: h.expression,
                    result: h.result,
                    time: h.time,
                })
                .collect(),
        )
    }

    pub fn entry(&self, index: usize) -> Option<HistoryEntry> {
        match self.load() {
            Ok(mut entries) if index < entries.len() => Some(entries.swap_remove(index)),
            Ok(_) => None,
            Err(e) => {
                log::warn!("cannot read history: {e}");
                None
            }
        }
    }

    /// Deletes everything, but only if `confirm` agrees.
    pub fn clear<F>(&mut self, confirm: F) -> Result<bool, HistoryError>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(CLEAR_PROMPT) {
            return Ok(false);
        }
        self.storage
            .remove_item(HISTORY_KEY)
            .map_err(HistoryError::StorageWriteFailure)?;
        Ok(true)
    }

    pub fn export_json(&self) -> Result<String, HistoryError> {
        let entries = self.load()?;
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, HistoryError> {
        let text = self.export_json()?;
        let path = dir.join(EXPORT_FILE_NAME);
        fs::write(&path, text).map_err(|source| HistoryError::Export { path: path.clone(), source })?;
        log::info!("exported history to {} ({EXPORT_MIME})", path.display());
        Ok(path)
    }
}
