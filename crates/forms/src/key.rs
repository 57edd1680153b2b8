//! Encryption key lifecycle: generate once, persist, reuse.

use {
    tracing::{debug, info, warn},
    zeroize::Zeroizing,
};

use {formstash_common::StorageKind, formstash_storage::StorageAdapter, uuid::Uuid};

use crate::options::SessionOptions;

/// Backend key under which the encryption key is kept.
pub const RESERVED_KEY: &str = "uuid";

/// Random RFC 4122 version 4 identifier.
///
/// `None` gives the canonical 36-character form, e.g.
/// `"1b4e28ba-2fa1-41d2-883f-0016d3cca427"`. `Some(n)` drops the dashes and
/// keeps the first `n` hex digits (at most 32).
pub fn gen_uuid(len: Option<usize>) -> String {
    let id = Uuid::new_v4();
    match len {
        None => id.hyphenated().to_string(),
        Some(n) => id.simple().to_string().chars().take(n).collect(),
    }
}

/// Reads or creates the key in the session's backend.
pub struct KeyManager<'a> {
    adapter: &'a StorageAdapter,
}

impl<'a> KeyManager<'a> {
    pub fn new(adapter: &'a StorageAdapter) -> Self {
        Self { adapter }
    }

    /// Attach the encryption key to `opts`.
    ///
    /// No-op with encryption off. Otherwise the key stored under
    /// [`RESERVED_KEY`] wins; failing that the configured seed, then a fresh
    /// identifier, is adopted and written back once. Under the cookie
    /// backend an existing key is rewritten to renew its expiry.
    #[must_use]
    pub fn ensure_key(&self, mut opts: SessionOptions) -> SessionOptions {
        if !opts.encryption_enabled {
            return opts;
        }

        if let Some(stored) = self.adapter.get(opts.storage, RESERVED_KEY) {
            debug!(app_id = %opts.app_id, "reusing stored encryption key");
            // Cookies expire; rewrite the key so it outlives the records it protects.
            let (handle, _) = self.adapter.resolve_backend(opts.storage);
            if handle.kind() == Some(StorageKind::Cookie)
                && !self.adapter.set(opts.storage, RESERVED_KEY, &stored)
            {
                warn!(app_id = %opts.app_id, "could not refresh encryption key cookie");
            }
            opts.key = Some(Zeroizing::new(stored));
            return opts;
        }

        let (key, source) = match opts.key_seed() {
            Some(seed) => (seed.to_string(), "seed"),
            None => (gen_uuid(None), "generated"),
        };
        if self.adapter.set(opts.storage, RESERVED_KEY, &key) {
            info!(app_id = %opts.app_id, source, "stored new encryption key");
        } else {
            warn!(
                app_id = %opts.app_id,
                "could not persist encryption key; values saved this session will not be readable later"
            );
        }
        opts.key = Some(Zeroizing::new(key));
        opts
    }
}
