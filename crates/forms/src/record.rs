//! Persisted shapes: the per-form record and the envelope stored under the
//! app id.
//!
//! Blob layout, one backend entry:
//!
//! ```json
//! {"layout":"blob","version":1,"forms":{"signup":{"email":"...","name":"..."}}}
//! ```
//!
//! Per-field layout, an index under the app id plus one entry per field at
//! `<app_id>.<form_id>.<field>`:
//!
//! ```json
//! {"layout":"per_field","version":1,"forms":{"signup":["email","name"]}}
//! ```

use std::collections::{BTreeMap, BTreeSet};

use {
    formstash_common::StorageLayout,
    serde::{Deserialize, Serialize},
};

/// Envelope format version written by this build.
pub const ENVELOPE_VERSION: u32 = 1;

/// Field name to stored (plaintext or ciphertext) value for one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredRecord(BTreeMap<String, String>);

impl StoredRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Shallow merge: every entry of `newer` replaces the same name here,
    /// names only present here are kept.
    #[must_use]
    pub fn merged_with(mut self, newer: StoredRecord) -> Self {
        self.0.extend(newer.0);
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StoredRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The document stored under the app id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Envelope {
    Blob {
        version: u32,
        #[serde(default)]
        forms: BTreeMap<String, StoredRecord>,
    },
    PerField {
        version: u32,
        #[serde(default)]
        forms: BTreeMap<String, BTreeSet<String>>,
    },
}

impl Envelope {
    /// Empty envelope of the given layout at the current version.
    pub fn empty(layout: StorageLayout) -> Self {
        match layout {
            StorageLayout::Blob => Self::Blob {
                version: ENVELOPE_VERSION,
                forms: BTreeMap::new(),
            },
            StorageLayout::PerField => Self::PerField {
                version: ENVELOPE_VERSION,
                forms: BTreeMap::new(),
            },
        }
    }

    pub fn layout(&self) -> StorageLayout {
        match self {
            Self::Blob { .. } => StorageLayout::Blob,
            Self::PerField { .. } => StorageLayout::PerField,
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Self::Blob { version, .. } | Self::PerField { version, .. } => *version,
        }
    }

    /// Parse a stored envelope, accepting only `expected` at the current
    /// version. The error is a human-readable reason.
    pub fn parse(raw: &str, expected: StorageLayout) -> Result<Self, String> {
        let envelope: Self =
            serde_json::from_str(raw).map_err(|e| format!("not a formstash envelope: {e}"))?;
        if envelope.version() != ENVELOPE_VERSION {
            return Err(format!(
                "envelope version {} is not supported (expected {ENVELOPE_VERSION})",
                envelope.version()
            ));
        }
        if envelope.layout() != expected {
            return Err(format!(
                "stored with {} layout, configured for {}",
                envelope.layout(),
                expected
            ));
        }
        Ok(envelope)
    }
}

/// Backend key of one field under the per-field layout.
///
/// Parts are joined with `.`; a `.` or `%` inside a part is percent-encoded
/// so distinct (app, form, field) triples never share a key.
pub fn field_key(app_id: &str, form_id: &str, name: &str) -> String {
    [app_id, form_id, name]
        .iter()
        .map(|part| escape_key_part(part))
        .collect::<Vec<_>>()
        .join(".")
}

fn escape_key_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => out.push_str("%25"),
            '.' => out.push_str("%2E"),
            _ => out.push(c),
        }
    }
    out
}
