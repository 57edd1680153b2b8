//! Runtime options of one form session.

use std::fmt;

use {
    formstash_common::{StorageKind, StorageLayout},
    formstash_config::FormStashConfig,
    zeroize::Zeroizing,
};

/// What a session was configured with, plus the encryption key once the
/// key manager has attached it.
#[derive(Clone)]
pub struct SessionOptions {
    pub app_id: String,
    pub storage: StorageKind,
    pub layout: StorageLayout,
    pub encryption_enabled: bool,
    /// Passphrase adopted when the backend holds no key yet.
    pub key_seed: Option<Zeroizing<String>>,
    /// Key in use for this session; `None` until ensured.
    pub key: Option<Zeroizing<String>>,
}

impl SessionOptions {
    pub fn new(app_id: impl Into<String>, storage: StorageKind) -> Self {
        Self {
            app_id: app_id.into(),
            storage,
            layout: StorageLayout::default(),
            encryption_enabled: false,
            key_seed: None,
            key: None,
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: StorageLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.encryption_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_key_seed(mut self, seed: impl Into<String>) -> Self {
        self.key_seed = Some(Zeroizing::new(seed.into()));
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(Zeroizing::new(key.into()));
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().map(String::as_str)
    }

    pub fn key_seed(&self) -> Option<&str> {
        self.key_seed
            .as_deref()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&FormStashConfig::default())
    }
}

impl From<&FormStashConfig> for SessionOptions {
    fn from(config: &FormStashConfig) -> Self {
        Self {
            app_id: config.app_id.clone(),
            storage: config.storage,
            layout: config.layout,
            encryption_enabled: config.encryption.enabled,
            key_seed: config
                .encryption
                .seed()
                .map(|s| Zeroizing::new(s.to_string())),
            key: None,
        }
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("app_id", &self.app_id)
            .field("storage", &self.storage)
            .field("layout", &self.layout)
            .field("encryption_enabled", &self.encryption_enabled)
            .field("key_seed", &self.key_seed.as_ref().map(|_| "[REDACTED]"))
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
