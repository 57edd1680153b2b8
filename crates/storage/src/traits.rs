//! Backend primitives.
//!
//! These are the raw collaborators: they report failures as errors and
//! return whatever they hold, empty strings included. Normalizing both into
//! the boolean / absent contract is the adapter's job.

use std::time::Duration;

use crate::error::Result;

/// Durable or session-scoped key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Number of entries currently held.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether the store can be used at all in this environment.
    fn probe(&self) -> bool {
        true
    }
}

/// Cookie storage. Every cookie is written with an explicit lifetime.
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<String>>;

    fn put(&self, name: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Number of live (unexpired) cookies.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn probe(&self) -> bool {
        true
    }
}
