//! Storage backends for the cache.
//!
//! A backend stores opaque bytes under string keys. The [`Cache`](crate::Cache)
//! wrapper layers JSON serialization on top.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tempfile::NamedTempFile;

use crate::CacheError;

/// File extension used by [`FileBackend`] entries.
const ENTRY_EXTENSION: &str = "json";

/// Raw byte storage keyed by string.
pub trait KvBackend: Send + Sync {
    /// Read the bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// List every key currently stored.
    fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Check whether `key` is present.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-process backend. Contents live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::StoreError("memory store lock poisoned".to_string()))
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.entries()?.keys().cloned().collect())
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries()?.contains_key(key))
    }
}

/// Directory backend storing one file per key.
///
/// File names are the URL-safe base64 encoding of the key, so keys such as
/// `cart:sess_abc` are safe on every filesystem. Writes go through a
/// uniquely named temporary file and a rename so readers never see a
/// partial entry.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a directory-backed store.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("empty key".to_string()));
        }
        let name = format!("{}.{}", URL_SAFE_NO_PAD.encode(key), ENTRY_EXTENSION);
        Ok(self.dir.join(name))
    }

    fn io_error(key: &str, err: io::Error) -> CacheError {
        CacheError::StoreError(format!("{}: {}", key, err))
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.entry_path(key)?;

        // Each write gets its own temp file, so concurrent writers to one key
        // never share a partial file. The last rename wins.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| Self::io_error(key, e))?;
        tmp.write_all(value).map_err(|e| Self::io_error(key, e))?;
        tmp.as_file().sync_all().map_err(|e| Self::io_error(key, e))?;
        tmp.persist(&path)
            .map(drop)
            .map_err(|e| Self::io_error(key, e.error))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| CacheError::StoreError(format!("{}: {}", self.dir.display(), e)))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::StoreError(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match URL_SAFE_NO_PAD.decode(stem) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(key) => keys.push(key),
                    Err(_) => tracing::debug!(file = %path.display(), "skipping non-utf8 entry"),
                },
                Err(_) => tracing::debug!(file = %path.display(), "skipping foreign file"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_roundtrip() {
        let backend = MemoryBackend::new();
        backend.set("a", b"1").unwrap();
        assert_eq!(backend.get("a").unwrap(), Some(b"1".to_vec()));
        assert!(backend.exists("a").unwrap());

        backend.delete("a").unwrap();
        assert_eq!(backend.get("a").unwrap(), None);
        assert!(!backend.exists("a").unwrap());
    }

    #[test]
    fn test_memory_delete_missing_is_ok() {
        let backend = MemoryBackend::new();
        assert!(backend.delete("nope").is_ok());
    }

    #[test]
    fn test_file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let first = FileBackend::open(dir.path()).unwrap();
        first.set("cart:sess_1", b"[]").unwrap();

        let second = FileBackend::open(dir.path()).unwrap();
        assert_eq!(second.get("cart:sess_1").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_file_backend_keys_decode() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set("cart:b", b"1").unwrap();
        backend.set("cart:a", b"2").unwrap();
        fs::write(dir.path().join("README.txt"), "not an entry").unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["cart:a", "cart:b"]);
    }

    #[test]
    fn test_file_backend_overwrite_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set("k", b"old").unwrap();
        backend.set("k", b"new").unwrap();
        assert_eq!(backend.get("k").unwrap(), Some(b"new".to_vec()));

        backend.delete("k").unwrap();
        backend.delete("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_backend_concurrent_writers_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let values: Vec<Vec<u8>> = (0..8).map(|i| format!("[{}]", i).into_bytes()).collect();

        std::thread::scope(|scope| {
            for value in &values {
                let backend = FileBackend::open(dir.path()).unwrap();
                scope.spawn(move || {
                    for _ in 0..25 {
                        backend.set("cart:shared", value).unwrap();
                    }
                });
            }
        });

        let backend = FileBackend::open(dir.path()).unwrap();
        let stored = backend.get("cart:shared").unwrap().unwrap();
        assert!(values.contains(&stored));
        assert_eq!(backend.keys().unwrap(), vec!["cart:shared"]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_backend_rejects_empty_key() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert!(matches!(
            backend.set("", b"x"),
            Err(CacheError::InvalidKey(_))
        ));
    }
}
