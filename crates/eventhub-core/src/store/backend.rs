//! Storage backends for named containers.
//!
//! A backend is a flat key/value area of strings, the shape of a browser's
//! local storage. The event store keeps its whole list under one key.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::StoreError;
use crate::lock::StoreLock;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// A key/value area holding serialized containers.
pub trait StorageBackend: Send + Sync {
    /// Read the raw container stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the container under `key` with `value`.
    ///
    /// A failed write must leave the previous value in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QuotaExceeded`] or [`StoreError::Io`] when the
    /// write is rejected.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the container under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backend rejects the removal.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Take the cross-process writer lock for `key`, if the backend has one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Lock`] if the lock cannot be acquired.
    fn lock(&self, key: &str) -> Result<Option<StoreLock>, StoreError>;
}

fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid storage key '{key}'"),
        )))
    }
}

fn check_quota(quota: Option<usize>, needed: usize) -> Result<(), StoreError> {
    match quota {
        Some(quota) if needed > quota => Err(StoreError::QuotaExceeded { needed, quota }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// FileBackend
// ---------------------------------------------------------------------------

/// Containers stored as `<dir>/<key>.json`, each guarded by `<dir>/<key>.lock`.
///
/// Writes go to a hidden sibling file that is renamed over the container, so
/// readers never observe a half-written list.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    lock_timeout: Duration,
    quota_bytes: Option<usize>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            quota_bytes: None,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Reject writes whose container would exceed `bytes`.
    #[must_use]
    pub const fn with_quota(mut self, bytes: Option<usize>) -> Self {
        self.quota_bytes = bytes;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn container_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    #[must_use]
    pub fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.lock"))
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        match fs::read_to_string(self.container_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        check_quota(self.quota_bytes, value.len())?;
        fs::create_dir_all(&self.dir)?;

        let staging = self.staging_path(key);
        let result = (|| {
            let mut file = fs::File::create(&staging)?;
            file.write_all(value.as_bytes())?;
            file.sync_data()?;
            fs::rename(&staging, self.container_path(key))
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&staging);
            return Err(StoreError::Io(err));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        match fs::remove_file(self.container_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn lock(&self, key: &str) -> Result<Option<StoreLock>, StoreError> {
        check_key(key)?;
        Ok(Some(StoreLock::acquire(
            &self.lock_path(key),
            self.lock_timeout,
        )?))
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// In-process storage area with an optional byte quota across all keys.
///
/// Writes can be switched off wholesale with [`MemoryBackend::set_read_only`]
/// to exercise write-failure paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    read_only: AtomicBool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size (keys plus values) of everything stored.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Store a raw value, bypassing quota and read-only checks.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "storage area is read-only",
            )));
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        check_quota(self.quota_bytes, others + key.len() + value.len())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn lock(&self, key: &str) -> Result<Option<StoreLock>, StoreError> {
        check_key(key)?;
        Ok(None)
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn lock(&self, key: &str) -> Result<Option<StoreLock>, StoreError> {
        (**self).lock(key)
    }
}
