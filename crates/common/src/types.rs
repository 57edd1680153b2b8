//! Storage selection types shared by the config, storage, and forms crates.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which storage backend a form persists into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Shared across every session of the origin, survives restarts.
    #[default]
    #[serde(alias = "localStorage")]
    Durable,
    /// Scoped to one session; gone when the session ends.
    #[serde(alias = "sessionStorage")]
    Session,
    /// Small, size-limited entries with a fixed expiry.
    Cookie,
}

impl StorageKind {
    pub const ALL: [Self; 3] = [Self::Durable, Self::Session, Self::Cookie];

    /// Stable name used in logs and config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Session => "session",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "durable" | "localStorage" => Ok(Self::Durable),
            "session" | "sessionStorage" => Ok(Self::Session),
            "cookie" => Ok(Self::Cookie),
            other => Err(Error::UnknownStorageKind(other.to_string())),
        }
    }
}

/// How a form's record is laid out inside the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLayout {
    /// One JSON document under the app id holding every field.
    #[default]
    Blob,
    /// One backend entry per field, indexed by a JSON document under the app id.
    PerField,
}

impl StorageLayout {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::PerField => "per_field",
        }
    }
}

impl fmt::Display for StorageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "per_field" | "per-field" => Ok(Self::PerField),
            other => Err(Error::UnknownLayout(other.to_string())),
        }
    }
}
