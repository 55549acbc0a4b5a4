//! Durable key-value storage for the project and its UI index.
//! 專案與介面狀態的持久化鍵值儲存。

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::project::Project;
use crate::util::write_atomic;

/// Errors emitted by storage backends and the state codec.
/// 儲存後端與狀態編碼可能產生的錯誤。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid persisted state: {0}")]
    Invalid(String),
}

/// Key-value persistence boundary.
/// 鍵值持久化邊界。
pub trait ProjectStorage {
    /// Reads the payload stored under `key`, `Ok(None)` when absent.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replaces the payload stored under `key`.
    fn write(&mut self, key: &str, payload: &[u8]) -> Result<(), StorageError>;
}

/// Project plus UI index as restored from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub project: Option<Project>,
    pub expanded_folders: BTreeSet<String>,
    pub selected_file: Option<String>,
}

#[derive(Serialize)]
struct PersistedStateRef<'a> {
    project: Option<&'a Project>,
    expanded_folders: Vec<&'a str>,
    selected_file: Option<&'a str>,
}

#[derive(Deserialize)]
struct PersistedStateOwned {
    #[serde(default)]
    project: Option<Project>,
    #[serde(default)]
    expanded_folders: Vec<String>,
    #[serde(default)]
    selected_file: Option<String>,
}

/// Serialises the persisted state; the expanded set is written as a sorted
/// sequence.
pub fn encode_state(
    project: Option<&Project>,
    expanded_folders: &BTreeSet<String>,
    selected_file: Option<&str>,
) -> Result<Vec<u8>, StorageError> {
    let view = PersistedStateRef {
        project,
        expanded_folders: expanded_folders.iter().map(String::as_str).collect(),
        selected_file,
    };
    serde_json::to_vec_pretty(&view).map_err(|err| StorageError::Invalid(err.to_string()))
}

/// Restores state produced by [`encode_state`], rebuilding the expanded set.
pub fn decode_state(payload: &[u8]) -> Result<PersistedState, StorageError> {
    let owned: PersistedStateOwned =
        serde_json::from_slice(payload).map_err(|err| StorageError::Invalid(err.to_string()))?;
    Ok(PersistedState {
        project: owned.project,
        expanded_folders: owned.expanded_folders.into_iter().collect(),
        selected_file: owned.selected_file,
    })
}

/// Stores each key as `<dir>/<key>.json`, written atomically.
/// 以 JSON 檔案搭配原子寫入保存每個鍵。
#[derive(Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ProjectStorage for JsonFileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn write(&mut self, key: &str, payload: &[u8]) -> Result<(), StorageError> {
        write_atomic(&self.path_for(key), payload).map_err(StorageError::Io)
    }
}

/// In-process storage. Clones share the same entries, so a caller can keep a
/// handle to inspect what a store has written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Payload currently stored under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.borrow().get(key).cloned()
    }
}

impl ProjectStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, payload: &[u8]) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), payload.to_vec());
        Ok(())
    }
}
