//! Transparent persistence of form field values across page loads.
//!
//! A [`SessionController`] ties the pieces together: it validates the
//! configuration against the collaborators the host provides, makes sure an
//! encryption key exists when encryption is on, restores the last saved
//! values into the form, and persists the form's current values on every
//! save.
//!
//! Storage goes through [`formstash_storage::StorageAdapter`], encryption
//! through [`formstash_vault::PassphraseCipher`], and the form itself through
//! the [`FormScope`] trait, so none of them are tied to a particular UI
//! toolkit or browser API.

pub mod codec;
pub mod error;
pub mod field;
pub mod key;
pub mod options;
pub mod record;
pub mod serializer;
pub mod session;
pub mod store;

pub use {
    codec::ValueCodec,
    error::{Error, Result},
    field::{Field, FieldKind, FormScope, MemoryForm, NamedValueSet},
    key::{KeyManager, RESERVED_KEY, gen_uuid},
    options::SessionOptions,
    record::{ENVELOPE_VERSION, Envelope, StoredRecord},
    serializer::FieldSerializer,
    session::{Environment, SessionController, SessionState},
    store::RecordStore,
};
