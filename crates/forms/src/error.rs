use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The configuration asks for something the environment cannot provide.
    #[error("configuration rejected: {}", reasons.join("; "))]
    Rejected { reasons: Vec<String> },

    /// Encryption is on but no key has been established, so the value would
    /// otherwise be written in plaintext.
    #[error("encryption is enabled but no key is available")]
    Unkeyed,

    /// Encryption is on but no cipher was provided.
    #[error("encryption is enabled but no cipher is available")]
    NoCipher,

    #[error(transparent)]
    Cipher(#[from] formstash_vault::VaultError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The backend refused or could not take a write.
    #[error("failed to write {key} to storage")]
    WriteFailed { key: String },

    /// The record stored under the app id is not one this build writes.
    #[error("stored record under {app_id} is incompatible: {reason}")]
    IncompatibleRecord { app_id: String, reason: String },

    /// An operation called in the wrong lifecycle state.
    #[error("session is {state}, expected {expected}")]
    InvalidState {
        state: crate::session::SessionState,
        expected: crate::session::SessionState,
    },
}

impl Error {
    #[must_use]
    pub fn write_failed(key: impl Into<String>) -> Self {
        Self::WriteFailed { key: key.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
