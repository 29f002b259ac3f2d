//! Snapshot-based undo/redo.
//!
//! Every committed edit records a serialized copy of the whole scene. Undo
//! and redo move a cursor over that list; restoring the scene from the
//! snapshot under the cursor is the caller's job. History is linear: a new
//! record after an undo discards everything past the cursor.

use crate::background::Background;
use serde::{Deserialize, Serialize};

/// Snapshots kept by default.
pub const HISTORY_CAPACITY: usize = 20;

/// One history entry: the serialized scene and the background it sits on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub background: Background,
    /// Scene as produced by `SceneAdapter::serialize`.
    pub scene: String,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEngine {
    snapshots: Vec<String>,
    /// Index of the snapshot matching the live scene. `None` when empty.
    cursor: Option<usize>,
    capacity: usize,
}

impl HistoryEngine {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: Vec::with_capacity(capacity),
            cursor: None,
            capacity,
        }
    }

    /// Rebuild from persisted parts. `cursor` uses −1 for "empty"; values
    /// out of range are clamped to the newest snapshot.
    pub fn from_parts(mut snapshots: Vec<String>, cursor: i64, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut cursor = cursor;
        if snapshots.len() > capacity {
            let excess = snapshots.len() - capacity;
            snapshots.drain(..excess);
            cursor -= excess as i64;
        }
        let cursor = match snapshots.len() {
            0 => None,
            len if cursor < 0 || cursor as usize >= len => {
                log::warn!("history cursor {cursor} out of range for {len} snapshots, using newest");
                Some(len - 1)
            }
            _ => Some(cursor as usize),
        };
        Self {
            snapshots,
            cursor,
            capacity,
        }
    }

    /// Record a snapshot after the cursor, dropping any redo entries.
    ///
    /// Once the window is full the oldest snapshot is dropped and the cursor
    /// stays on the last slot.
    pub fn record(&mut self, snapshot: String) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Index undo would restore, if any.
    pub fn undo_target(&self) -> Option<usize> {
        match self.cursor {
            Some(c) if c > 0 => Some(c - 1),
            _ => None,
        }
    }

    /// Index redo would restore, if any.
    pub fn redo_target(&self) -> Option<usize> {
        let next = self.cursor? + 1;
        (next < self.snapshots.len()).then_some(next)
    }

    /// Move the cursor once the scene shows `snapshot(index)`.
    pub fn move_to(&mut self, index: usize) -> bool {
        if index >= self.snapshots.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    pub fn snapshot(&self, index: usize) -> Option<&str> {
        self.snapshots.get(index).map(String::as_str)
    }

    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor in persisted form, −1 when empty.
    pub fn cursor_value(&self) -> i64 {
        self.cursor.map_or(-1, |c| c as i64)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        self.undo_target().is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.redo_target().is_some()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }
}

impl Default for HistoryEngine {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
