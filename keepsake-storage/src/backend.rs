use crate::durable::TEMP_SUFFIX;
use crate::{StorageError, StorageResult};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Named-file primitives within a single storage root.
///
/// Names are plain file names (no separators); the backend decides where
/// they live.
pub trait StorageBackend: Send + Sync {
    /// Reads a whole file. An absent file is `Ok(None)`, not an error.
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Creates or truncates `name` and writes `bytes` to it.
    fn write(&self, name: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Whether `name` exists.
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Atomically renames `from` onto `to`, replacing any existing `to`.
    fn replace(&self, from: &str, to: &str) -> StorageResult<()>;

    /// Removes `name`. Removing an absent file succeeds.
    fn remove(&self, name: &str) -> StorageResult<()>;
}

// ── Filesystem ───────────────────────────────────────────────────

/// Stores each file directly under a root directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Uses `root` without touching the filesystem. The directory is
    /// created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates `root` if needed and returns a backend for it.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let backend = Self::new(root);
        fs::create_dir_all(&backend.root).map_err(|e| StorageError::io(&backend.root, e))?;
        Ok(backend)
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for `name`.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Removes `*.tmp` leftovers of an interrupted replace.
    ///
    /// Returns how many files were removed. A missing root is not an error.
    pub fn sweep_temp_files(&self) -> StorageResult<usize> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::io(&self.root, e)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.root, e))?;
            let path = entry.path();
            let is_temp = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(TEMP_SUFFIX));
            if !is_temp || !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %path.display(), "Removed stale temp file");
                    removed += 1;
                }
                Err(e) => warn!(file = %path.display(), error = %e, "Could not remove stale temp file"),
            }
        }
        Ok(removed)
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> StorageResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| StorageError::io(&self.root, e))?;
        let path = self.path(name);
        let mut file = File::create(&path).map_err(|e| StorageError::io(&path, e))?;
        file.write_all(bytes).map_err(|e| StorageError::io(&path, e))?;
        file.sync_all().map_err(|e| StorageError::io(&path, e))?;
        Ok(())
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.path(name);
        path.try_exists().map_err(|e| StorageError::io(path, e))
    }

    fn replace(&self, from: &str, to: &str) -> StorageResult<()> {
        let target = self.path(to);
        fs::rename(self.path(from), &target).map_err(|e| StorageError::io(target, e))
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        let path = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

// ── In-memory ────────────────────────────────────────────────────

/// Keeps files in a map. Replace is atomic under the map lock.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all stored files, sorted.
    pub fn file_names(&self) -> Vec<String> {
        self.files().keys().cloned().collect()
    }

    /// Contents of `name`, if present.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files().get(name).cloned()
    }

    /// Stores `bytes` under `name` directly, bypassing the replace protocol.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files().insert(name.into(), bytes.into());
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.files().get(name).cloned())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> StorageResult<()> {
        self.files().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.files().contains_key(name))
    }

    fn replace(&self, from: &str, to: &str) -> StorageResult<()> {
        let mut files = self.files();
        let bytes = files.remove(from).ok_or_else(|| {
            StorageError::io(
                from,
                std::io::Error::new(ErrorKind::NotFound, "source file does not exist"),
            )
        })?;
        files.insert(to.to_string(), bytes);
        Ok(())
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        self.files().remove(name);
        Ok(())
    }
}
