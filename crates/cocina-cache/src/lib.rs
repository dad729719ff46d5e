//! Type-safe key-value caching layer for CocinaShop.
//!
//! Provides a small, ergonomic API for storing JSON-serialized values under
//! namespaced keys, with interchangeable backends:
//!
//! - [`MemoryBackend`] for tests and single-process use
//! - [`FileBackend`] for data that must survive a restart
//!
//! # Example
//!
//! ```
//! use cocina_cache::{cache_key, Cache, Sessions};
//!
//! let cache = Cache::open_memory();
//! let session = Sessions::new(cache.clone()).current_or_start().unwrap();
//!
//! let key = cache_key!("cart", session);
//! cache.set(&key, &vec!["p1", "p2"]).unwrap();
//!
//! let items: Option<Vec<String>> = cache.get(&key).unwrap();
//! assert_eq!(items.map(|v| v.len()), Some(2));
//! ```

mod backend;
mod error;
mod kv;
mod session;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;
pub use session::{SessionId, Sessions, SESSION_NAMESPACE};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError, SessionId, Sessions};
}
