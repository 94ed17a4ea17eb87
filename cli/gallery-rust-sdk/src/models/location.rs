//! Navigable locations.
//!
//! The query of the current location is the single source of truth for
//! the active filters. Changing a filter pushes a new location rather than
//! editing state in place, so earlier filter states stay reachable with
//! [History::back] and [History::forward].

use std::path::{Path, PathBuf};

use gallery_catalog::Query;
use gallery_core::{StateFileError, acquire_lock, read_json, serialize_atomically, traceable_path};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Oldest entries are dropped once a history grows past this length.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// A location whose query can be read and replaced by pushing a new entry.
pub trait Location {
    /// The query of the current entry.
    fn query(&self) -> &Query;

    /// Make `query` the current entry.
    fn push(&mut self, query: Query);
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file {0} is corrupt")]
    Corrupt(PathBuf, #[source] serde_json::Error),
    #[error(transparent)]
    StateFile(StateFileError),
}

impl From<StateFileError> for HistoryError {
    fn from(err: StateFileError) -> Self {
        match err {
            StateFileError::Parse(path, err) => HistoryError::Corrupt(path, err),
            err => HistoryError::StateFile(err),
        }
    }
}

/// A back/forward stack of queries.
///
/// Deserializing checks that the position points at an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistoryFile")]
pub struct History {
    entries: Vec<Query>,
    position: usize,
}

#[derive(Deserialize)]
struct HistoryFile {
    entries: Vec<Query>,
    position: usize,
}

#[derive(Debug, Error)]
#[error("position {position} is out of {len} entries")]
pub struct InvalidPosition {
    pub position: usize,
    pub len: usize,
}

impl TryFrom<HistoryFile> for History {
    type Error = InvalidPosition;

    fn try_from(file: HistoryFile) -> Result<Self, Self::Error> {
        if file.position >= file.entries.len() {
            return Err(InvalidPosition {
                position: file.position,
                len: file.entries.len(),
            });
        }
        Ok(History {
            entries: file.entries,
            position: file.position,
        })
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Query::new())
    }
}

impl History {
    pub fn new(initial: Query) -> Self {
        Self {
            entries: vec![initial],
            position: 0,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.position > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.position + 1 < self.entries.len()
    }

    /// Move to the previous entry, returns false if there is none.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.position -= 1;
        true
    }

    /// Move to the next entry, returns false if there is none.
    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.position += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a persisted history, or start an empty one if none exists.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let Some(history) = read_json::<History>(path)? else {
            debug!(path = traceable_path(path), "no history file, starting fresh");
            return Ok(History::default());
        };
        Ok(history)
    }

    /// Persist the history, replacing the file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HistoryError> {
        let path = path.as_ref();
        let lock = acquire_lock(path)?;
        debug!(path = traceable_path(path), entries = self.entries.len(), "writing history");
        serialize_atomically(self, &path, lock)?;
        Ok(())
    }
}

impl Location for History {
    fn query(&self) -> &Query {
        &self.entries[self.position]
    }

    fn push(&mut self, query: Query) {
        self.entries.truncate(self.position + 1);
        self.entries.push(query);
        if self.entries.len() > MAX_HISTORY_ENTRIES {
            let excess = self.entries.len() - MAX_HISTORY_ENTRIES;
            self.entries.drain(..excess);
        }
        self.position = self.entries.len() - 1;
    }
}
