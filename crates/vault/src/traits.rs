//! Cipher traits.

use crate::error::VaultError;

/// Authenticated encryption under a raw 256-bit key.
///
/// Each implementation carries a version tag that is written into every blob
/// so a stored value can always be matched with the cipher that produced it.
pub trait KeyCipher: Send + Sync {
    /// Unique identifier for this cipher.
    fn version_tag(&self) -> u8;

    /// Seal `plaintext` under `key`, authenticating `aad` alongside it.
    ///
    /// The returned bytes must be accepted by [`decrypt`](Self::decrypt).
    fn encrypt(&self, key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, VaultError>;

    /// Open a blob produced by [`encrypt`](Self::encrypt).
    fn decrypt(&self, key: &[u8; 32], ciphertext: &[u8], aad: &[u8])
    -> Result<Vec<u8>, VaultError>;
}

/// String-to-string encryption under a passphrase.
///
/// This is the contract the form layer depends on: it never sees keys, salts,
/// or nonces, only the passphrase persisted next to the stored values.
pub trait PassphraseCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str, passphrase: &str) -> Result<String, VaultError>;

    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Result<String, VaultError>;
}
