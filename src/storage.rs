//! Record stores for autosaved attempts.
//!
//! A store maps a question-set key to the latest [`SessionRecord`]. Stores
//! report their failures; the session decides to swallow them.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::SessionRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("stored record for {key} is not valid JSON: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store is unavailable")]
    Unavailable,
}

/// Persistence adapter consumed by [`crate::ExamSession`].
pub trait RecordStore {
    fn save(&mut self, key: &str, record: &SessionRecord) -> Result<(), StoreError>;

    /// Returns `Ok(None)` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<SessionRecord>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn save(&mut self, key: &str, record: &SessionRecord) -> Result<(), StoreError> {
        (**self).save(key, record)
    }

    fn load(&self, key: &str) -> Result<Option<SessionRecord>, StoreError> {
        (**self).load(key)
    }
}

/// Stores each record as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl RecordStore for FileStore {
    fn save(&mut self, key: &str, record: &SessionRecord) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let json = serde_json::to_string_pretty(record).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        fs::write(self.path_for(key), json).map_err(io_err)
    }

    fn load(&self, key: &str) -> Result<Option<SessionRecord>, StoreError> {
        let content = match fs::read_to_string(self.path_for(key)) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            })
    }
}

/// In-process store; `fail_saves` makes every save return an error.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, SessionRecord>,
    pub fail_saves: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, record: SessionRecord) {
        self.records.insert(key.to_string(), record);
    }

    pub fn get(&self, key: &str) -> Option<&SessionRecord> {
        self.records.get(key)
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl RecordStore for MemoryStore {
    fn save(&mut self, key: &str, record: &SessionRecord) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable);
        }
        self.records.insert(key.to_string(), record.clone());
        self.saves += 1;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.records.get(key).cloned())
    }
}
