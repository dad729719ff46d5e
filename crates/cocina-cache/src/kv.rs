//! Key-Value store wrapper with automatic serialization.

use std::path::Path;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::backend::{FileBackend, KvBackend, MemoryBackend};
use crate::CacheError;

/// Type-safe cache over a [`KvBackend`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap; clones share the
/// same backend.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn KvBackend>,
}

impl Cache {
    /// Open an in-memory store.
    ///
    /// # Example
    ///
    /// ```
    /// let cache = cocina_cache::Cache::open_memory();
    /// cache.set("greeting", &"hola").unwrap();
    /// assert_eq!(cache.get::<String>("greeting").unwrap().as_deref(), Some("hola"));
    /// ```
    pub fn open_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    /// Open a directory-backed store, creating the directory if needed.
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::with_backend(FileBackend::open(dir)?))
    }

    /// Wrap an arbitrary backend.
    pub fn with_backend(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// ```rust,ignore
    /// let records: Option<Vec<CartRecord>> = cache.get("cart:sess_abc")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(key, &bytes)
    }

    /// Store raw bytes without serialization.
    pub fn set_raw(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.backend.set(key, bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.backend.keys()
    }

    /// Keys that start with `prefix:`.
    pub fn keys_in(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let namespace = format!("{}:", prefix);
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&namespace))
            .collect())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```
/// let session = "sess_123";
/// let key = cocina_cache::cache_key!("cart", session);
/// assert_eq!(key, "cart:sess_123");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
