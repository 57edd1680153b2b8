//! Storage backends and the adapter that unifies them.
//!
//! Three kinds of backend sit behind one get/set contract: a durable
//! key/value store, a session-scoped key/value store, and a cookie jar.
//! Backends are injected, never global. When the requested backend is
//! missing the adapter falls back to cookies and reports the downgrade.

pub mod adapter;
pub mod capability;
pub mod cookie;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use {
    adapter::{COOKIE_TTL, StorageAdapter},
    capability::{BackendHandle, Backends},
    cookie::{MAX_COOKIE_BYTES, MemoryCookieJar},
    error::{Error, Result},
    file::FileStore,
    memory::MemoryStore,
    traits::{CookieJar, KeyValueStore},
};
