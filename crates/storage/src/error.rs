use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("file lock failed: {message}")]
    Lock { message: String },

    /// The write would push the store past its byte quota.
    #[error("quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },

    /// A single cookie larger than the per-cookie limit.
    #[error("cookie {name} is {len} bytes, limit is {max}")]
    CookieTooLarge {
        name: String,
        len: usize,
        max: usize,
    },

    /// An underlying failure wrapped with what was being attempted.
    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn lock_failed(message: impl Into<String>) -> Self {
        Self::Lock {
            message: message.into(),
        }
    }
}

impl formstash_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

formstash_common::impl_context!();
