//! Vault error types.

/// Errors produced while encrypting or decrypting values.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Encryption or decryption failed (tampered data, wrong passphrase).
    #[error("cipher error: {0}")]
    CipherError(String),

    /// The blob was produced by a cipher this build does not know.
    #[error("unsupported cipher version: {0:#04x}")]
    UnsupportedVersion(u8),

    /// The blob is shorter than its fixed header.
    #[error("ciphertext truncated: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },

    /// Base64 decoding failed.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decrypted bytes are not valid UTF-8.
    #[error("decrypted value is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
