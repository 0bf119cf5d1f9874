//! Key-value persistence backends
//!
//! The history log never touches a storage location directly; it goes
//! through a [`KeyValueStore`] supplied by the host. Two backends ship with
//! the crate:
//! - [`MemoryStore`] for tests and ephemeral sessions
//! - [`FileStore`] keeping one JSON file per key, written atomically

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{StorageError, StorageResult};

/// Durable string storage keyed by name
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-process store with an optional per-value size quota
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values longer than `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    fn entries(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.quota.is_some_and(|quota| value.len() > quota) {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Store keeping each key in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StorageError::ReadError { path, source })
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::WriteError {
            path: self.dir.clone(),
            source,
        })?;
        write_atomic(&path, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            std::fs::remove_file(&path).map_err(|source| StorageError::WriteError { path, source })?;
        }
        Ok(())
    }
}

/// Write through a temp file in the same directory and rename over the
/// target, so readers see either the old value or the new one
fn write_atomic(path: &Path, content: &str) -> StorageResult<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "value".to_string());
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, uuid::Uuid::new_v4()));

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(source) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StorageError::WriteError {
            path: path.to_path_buf(),
            source,
        });
    }

    if let Err(source) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(StorageError::WriteError {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
