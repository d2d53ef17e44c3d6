//! RecordStore: the ordered diary collection on disk.
//!
//! One JSON file rewritten wholesale on every mutation. Writes go through
//! a temp file in the same directory followed by a rename, so a crash
//! mid-write cannot corrupt the previous contents.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::error::MemoirError;

/// One diary record: ciphertext plus the date it unlocks on.
/// Immutable once stored; destroyed only by deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Stable id assigned at creation. Data files written before ids
    /// existed lack the field; a fresh one is assigned on load.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Base64 of the AEAD wire format (nonce || ciphertext+tag).
    pub memory: String,
    pub unlock_date: NaiveDate,
}

pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection in insertion order. A missing file is an
    /// empty collection; a malformed one is an error, never silently
    /// dropped data.
    pub fn load_all(&self) -> Result<Vec<Entry>, MemoirError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Overwrite the backing file with `entries`. The write lands in a
    /// temp file first and is renamed over the old one, so the previous
    /// contents survive a failed save.
    pub fn save_all(&self, entries: &[Entry]) -> Result<(), MemoirError> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| MemoirError::Storage("data file has no parent directory".into()))?;
        fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| MemoirError::Storage(format!("persist data file: {e}")))?;
        debug!("saved {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    pub fn append(&self, entry: Entry) -> Result<(), MemoirError> {
        let mut entries = self.load_all()?;
        entries.push(entry);
        self.save_all(&entries)
    }

    /// Remove and return the entry at `index`. Later indices shift down.
    pub fn remove_at(&self, index: usize) -> Result<Entry, MemoirError> {
        let mut entries = self.load_all()?;
        if index >= entries.len() {
            return Err(MemoirError::IndexOutOfRange(index));
        }
        let removed = entries.remove(index);
        self.save_all(&entries)?;
        Ok(removed)
    }
}
