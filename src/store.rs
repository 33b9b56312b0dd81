//! Durable storage for the answer log and score table.
//!
//! Each record is a whole JSON document that is overwritten on every save.
//! Reads never fail: a missing or unreadable document loads as the empty default.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::types::{AnswerRecord, ScoreTable};

pub const ANSWERS_FILE: &str = "answers.json";
pub const SCORES_FILE: &str = "scores.json";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable")]
    Unavailable,
}

pub trait Store<T>: Send + Sync {
    /// Last successfully saved value, or `T::default()` if there is none
    fn load(&self) -> T;

    /// Replace the stored value
    fn save(&self, value: &T) -> StoreResult<()>;
}

pub type AnswerStore = dyn Store<Vec<AnswerRecord>>;
pub type ScoreStore = dyn Store<ScoreTable>;

/// A store backed by a single pretty-printed JSON file
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

impl<T> Store<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> T {
        if let Err(e) = self.ensure_parent_dir() {
            tracing::warn!("Failed to create data directory for {:?}: {}", self.path, e);
            return T::default();
        }

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored data at {:?}, starting empty", self.path);
                return T::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", self.path, e);
                return T::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring unreadable data in {:?}: {}", self.path, e);
                T::default()
            }
        }
    }

    fn save(&self, value: &T) -> StoreResult<()> {
        self.ensure_parent_dir()?;
        let data = serde_json::to_vec_pretty(value)?;

        // Write next to the target and rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!("Saved {:?}", self.path);
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    value: Mutex<T>,
    fail_saves: bool,
}

impl<T: Default> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(T::default()),
            fail_saves: false,
        }
    }

    /// A store whose saves always fail (loads still succeed)
    pub fn failing() -> Self {
        Self {
            value: Mutex::new(T::default()),
            fail_saves: true,
        }
    }
}

impl<T> MemoryStore<T> {
    pub fn with_value(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            fail_saves: false,
        }
    }
}

impl<T> Store<T> for MemoryStore<T>
where
    T: Clone + Default + Send,
{
    fn load(&self) -> T {
        match self.value.lock() {
            Ok(value) => value.clone(),
            Err(_) => T::default(),
        }
    }

    fn save(&self, value: &T) -> StoreResult<()> {
        if self.fail_saves {
            return Err(StoreError::Unavailable);
        }
        let mut slot = self.value.lock().map_err(|_| StoreError::Unavailable)?;
        *slot = value.clone();
        Ok(())
    }
}
