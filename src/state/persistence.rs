use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::Element;
use crate::util::time;

/// Errors that can occur while saving or restoring a document
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize document: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write document: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read document file: {0}")]
    ReadError(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A serializable copy of the element collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub elements: Vec<Element>,
    /// Seconds since the UNIX epoch
    pub timestamp: u64,
    /// Version of the application that wrote the snapshot
    pub version: String,
}

impl DocumentSnapshot {
    pub fn new(elements: &[Element]) -> Self {
        Self {
            elements: elements.to_vec(),
            timestamp: time::timestamp_secs(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    pub fn save_to(&self, path: &Path) -> PersistenceResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> PersistenceResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| PersistenceError::ReadError(format!("{}: {}", path.display(), e)))?;
        let mut snapshot: Self = serde_json::from_str(&json)?;
        snapshot.repair_tables();
        if snapshot.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Snapshot version {} differs from current version {}",
                snapshot.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        Ok(snapshot)
    }

    /// Hand-edited or truncated files can carry tables whose spans point
    /// outside the grid. Fix them before anything lays them out.
    fn repair_tables(&mut self) {
        for element in &mut self.elements {
            let id = element.id;
            if let Some(table) = element.as_table_mut().filter(|table| !table.is_consistent()) {
                log::warn!("Repairing inconsistent table {} in snapshot", id);
                table.repair();
            }
        }
    }
}

/// Periodic autosave of the document into a directory
#[derive(Debug, Clone)]
pub struct StatePersistence {
    /// Directory where autosave files are stored
    state_dir: PathBuf,
    /// Maximum number of autosave files to keep
    max_autosaves: usize,
    /// Interval between autosaves in seconds
    autosave_interval: u64,
    /// Last autosave timestamp
    last_autosave: u64,
}

impl StatePersistence {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            state_dir,
            max_autosaves: 5,
            autosave_interval: 60,
            last_autosave: 0,
        }
    }

    pub fn with_interval(mut self, seconds: u64) -> Self {
        self.autosave_interval = seconds;
        self
    }

    pub fn should_autosave(&self) -> bool {
        let now = time::timestamp_secs();
        now.saturating_sub(self.last_autosave) >= self.autosave_interval
    }

    /// Save the document if the interval has passed. Empty documents are skipped.
    pub fn try_autosave(&mut self, elements: &[Element]) -> PersistenceResult<()> {
        if elements.is_empty() || !self.should_autosave() {
            return Ok(());
        }
        let now = time::timestamp_millis();
        let path = self.state_dir.join(format!("autosave_{}.json", now));
        DocumentSnapshot::new(elements).save_to(&path)?;
        self.last_autosave = time::timestamp_secs();
        log::debug!("Autosaved {} elements to {}", elements.len(), path.display());

        self.cleanup_old_autosaves()
    }

    fn autosave_entries(&self) -> PersistenceResult<Vec<fs::DirEntry>> {
        if !self.state_dir.exists() {
            return Ok(Vec::new());
        }
        let mut autosaves = fs::read_dir(&self.state_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("autosave_"))
            .collect::<Vec<_>>();
        // names carry the millisecond timestamp, so name order is age order
        autosaves.sort_by_key(|entry| entry.file_name());
        Ok(autosaves)
    }

    fn cleanup_old_autosaves(&self) -> PersistenceResult<()> {
        let autosaves = self.autosave_entries()?;
        let excess = autosaves.len().saturating_sub(self.max_autosaves);
        for oldest in &autosaves[..excess] {
            fs::remove_file(oldest.path())?;
        }
        Ok(())
    }

    /// The most recent autosave file, if any
    pub fn find_latest_autosave(&self) -> PersistenceResult<Option<PathBuf>> {
        Ok(self.autosave_entries()?.last().map(|entry| entry.path()))
    }
}
