/// Config schema types (storage selection, encryption, backend settings).
use std::path::PathBuf;

use {
    formstash_common::{StorageKind, StorageLayout},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// App id used when none is configured.
pub const DEFAULT_APP_ID: &str = "formstash";

/// Backend key that holds the encryption key; no app id may use it.
pub const RESERVED_KEY_NAME: &str = "uuid";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormStashConfig {
    /// Namespace under which form records are stored.
    pub app_id: String,
    /// Requested backend. Falls back to cookies when unavailable.
    pub storage: StorageKind,
    /// Record layout inside the backend.
    pub layout: StorageLayout,
    pub encryption: EncryptionConfig,
    pub durable: DurableConfig,
    pub session: SessionStoreConfig,
}

impl Default for FormStashConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.into(),
            storage: StorageKind::default(),
            layout: StorageLayout::default(),
            encryption: EncryptionConfig::default(),
            durable: DurableConfig::default(),
            session: SessionStoreConfig::default(),
        }
    }
}

/// Encryption of stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Encrypt every stored value. Requires a cipher at startup.
    pub enabled: bool,
    /// Passphrase to adopt when the backend holds no key yet. When unset a
    /// random key is generated.
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_seed: Option<Secret<String>>,
    pub kdf: KdfConfig,
}

impl EncryptionConfig {
    /// The seed, if set and non-empty.
    pub fn seed(&self) -> Option<&str> {
        self.key_seed
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Argon2id costs for the passphrase cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Memory cost in KiB.
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            m_cost: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

/// File-backed durable store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DurableConfig {
    /// JSON file holding durable entries. When unset the host supplies its
    /// own durable backend, or none.
    pub path: Option<PathBuf>,
}

/// In-memory session store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStoreConfig {
    /// Byte quota over keys plus values. Unlimited when unset.
    pub quota_bytes: Option<usize>,
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
