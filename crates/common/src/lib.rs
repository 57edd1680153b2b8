//! Shared types, error definitions, and the usable-string guard used across
//! all formstash crates.

pub mod error;
pub mod guard;
pub mod types;

pub use {
    error::{Error, FromMessage, Result},
    guard::{is_usable, usable},
    types::{StorageKind, StorageLayout},
};
