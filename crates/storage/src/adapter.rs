//! Unified get/set/size facade over the three backends.
//!
//! Raw backend errors never escape: writes report `true`/`false`, reads
//! report a value or `None`, with failures logged. An empty stored string
//! reads back as `None`, the same as a missing key.

use std::time::Duration;

use {
    formstash_common::{StorageKind, usable},
    tracing::{debug, warn},
};

use crate::capability::{BackendHandle, Backends};

/// Lifetime given to every cookie the adapter writes.
pub const COOKIE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Default)]
pub struct StorageAdapter {
    backends: Backends,
}

impl StorageAdapter {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// See [`Backends::resolve`].
    pub fn resolve_backend(&self, requested: StorageKind) -> (BackendHandle<'_>, bool) {
        self.backends.resolve(requested)
    }

    /// Write `value` under `key`. Returns whether the write succeeded.
    pub fn set(&self, requested: StorageKind, key: &str, value: &str) -> bool {
        let (handle, _) = self.resolve_backend(requested);
        let result = match handle {
            BackendHandle::Store { store, .. } => store.put(key, value),
            BackendHandle::Cookie(jar) => jar.put(key, value, COOKIE_TTL),
            BackendHandle::Unavailable => {
                warn!(requested = %requested, key, "no storage backend available, value not saved");
                return false;
            },
        };

        match result {
            Ok(()) => {
                debug!(backend = ?handle.kind(), key, bytes = value.len(), "stored value");
                true
            },
            Err(e) => {
                warn!(backend = ?handle.kind(), key, error = %e, "storage write failed");
                false
            },
        }
    }

    /// Read `key`. Missing, empty, and unreadable entries are all `None`.
    pub fn get(&self, requested: StorageKind, key: &str) -> Option<String> {
        let (handle, _) = self.resolve_backend(requested);
        let result = match handle {
            BackendHandle::Store { store, .. } => store.get(key),
            BackendHandle::Cookie(jar) => jar.get(key),
            BackendHandle::Unavailable => return None,
        };

        match result {
            Ok(value) => usable(value.as_deref()).map(str::to_owned),
            Err(e) => {
                warn!(backend = ?handle.kind(), key, error = %e, "storage read failed");
                None
            },
        }
    }

    /// Number of entries in the resolved backend; 0 when unavailable or
    /// unreadable.
    pub fn size(&self, requested: StorageKind) -> usize {
        let (handle, _) = self.resolve_backend(requested);
        let result = match handle {
            BackendHandle::Store { store, .. } => store.len(),
            BackendHandle::Cookie(jar) => jar.len(),
            BackendHandle::Unavailable => return 0,
        };
        result.unwrap_or_else(|e| {
            warn!(backend = ?handle.kind(), error = %e, "storage size check failed");
            0
        })
    }
}
