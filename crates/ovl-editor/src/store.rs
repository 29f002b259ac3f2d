//! Persisted editor state.
//!
//! The whole session lives in one JSON blob, loaded once when the editor is
//! built and rewritten after every committed mutation. Where the blob lives
//! is up to the `StateStore` handed to the editor.

use crate::error::StoreError;
use ovl_core::TextElement;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The persisted blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub background_image_reference: Option<String>,
    pub elements: Vec<TextElement>,
    pub history_snapshots: Vec<String>,
    /// −1 when history is empty.
    pub history_cursor: i64,
    pub canvas_width: Option<f64>,
    pub canvas_height: Option<f64>,
    /// Native size of the background, used to scale exports back up.
    pub original_width: Option<f64>,
    pub original_height: Option<f64>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            background_image_reference: None,
            elements: Vec::new(),
            history_snapshots: Vec::new(),
            history_cursor: -1,
            canvas_width: None,
            canvas_height: None,
            original_width: None,
            original_height: None,
        }
    }
}

impl PersistedState {
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Backing storage for the persisted blob.
pub trait StateStore {
    /// The stored blob, or `None` if nothing has been saved.
    fn load(&mut self) -> Result<Option<String>, StoreError>;

    fn save(&mut self, blob: &str) -> Result<(), StoreError>;

    /// Forget the stored blob entirely.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Keeps the blob in memory. Used by tests and hosts without storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            saves: 0,
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl StateStore for MemoryStore {
    fn load(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<(), StoreError> {
        self.blob = Some(blob.to_owned());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.blob = None;
        Ok(())
    }
}

/// Keeps the blob in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&mut self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, blob: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, blob)?;
        log::debug!("saved editor state to {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
