//! Encryption of stored form values.
//!
//! Values are protected with a passphrase: each message gets a fresh salt,
//! the passphrase is stretched into a 256-bit key with Argon2id, and the value
//! is sealed with XChaCha20-Poly1305. The [`PassphraseCipher`] trait is the
//! seam the rest of the workspace talks to, so another cipher can be plugged
//! in without touching storage or serialization.

pub mod error;
pub mod kdf;
pub mod passphrase;
pub mod traits;
pub mod xchacha20;

pub use {
    error::VaultError,
    kdf::KdfParams,
    passphrase::XChaCha20PassphraseCipher,
    traits::{KeyCipher, PassphraseCipher},
    xchacha20::XChaCha20Poly1305Cipher,
};
