//! Browsing session identity.
//!
//! A session scopes everything a visitor stores (most importantly the cart)
//! so that a reload finds the same data while a new session starts clean.

use crate::{Cache, CacheError};
use serde::{Deserialize, Serialize};

/// Namespace holding session bookkeeping.
pub const SESSION_NAMESPACE: &str = "session";

/// A browsing session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Tracks the active session inside a cache.
#[derive(Debug, Clone)]
pub struct Sessions {
    cache: Cache,
}

impl Sessions {
    /// Track sessions in `cache`.
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// The active session, if one was started.
    pub fn current(&self) -> Result<Option<SessionId>, CacheError> {
        self.cache.get(&Self::current_key())
    }

    /// The active session, starting one when none exists.
    pub fn current_or_start(&self) -> Result<SessionId, CacheError> {
        match self.current()? {
            Some(id) => Ok(id),
            None => self.start(),
        }
    }

    /// Start a fresh session and make it the active one.
    pub fn start(&self) -> Result<SessionId, CacheError> {
        let id = SessionId::generate();
        self.cache.set(&Self::current_key(), &id)?;
        tracing::debug!(session = %id, "started session");
        Ok(id)
    }

    /// Forget the active session. Data stored under it is left in place.
    pub fn end(&self) -> Result<(), CacheError> {
        self.cache.delete(&Self::current_key())
    }

    fn current_key() -> String {
        crate::cache_key!(SESSION_NAMESPACE, "current")
    }
}
