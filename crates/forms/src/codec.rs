//! Per-value encryption.

use std::{fmt, sync::Arc};

use formstash_vault::PassphraseCipher;

use crate::{
    error::{Error, Result},
    options::SessionOptions,
};

/// Encrypts or decrypts a single value according to the session options.
///
/// With encryption off, values pass through untouched. With encryption on,
/// a missing key is an error rather than a silent plaintext write.
#[derive(Clone, Default)]
pub struct ValueCodec {
    cipher: Option<Arc<dyn PassphraseCipher>>,
}

impl fmt::Debug for ValueCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCodec")
            .field("cipher", &self.cipher.is_some())
            .finish()
    }
}

impl ValueCodec {
    pub fn new(cipher: Option<Arc<dyn PassphraseCipher>>) -> Self {
        Self { cipher }
    }

    /// Codec without a cipher; only usable with encryption off.
    pub fn plaintext() -> Self {
        Self::default()
    }

    pub fn has_cipher(&self) -> bool {
        self.cipher.is_some()
    }

    fn keyed<'a>(&'a self, opts: &'a SessionOptions) -> Result<(&'a dyn PassphraseCipher, &'a str)> {
        let key = opts.key().ok_or(Error::Unkeyed)?;
        let cipher = self.cipher.as_deref().ok_or(Error::NoCipher)?;
        Ok((cipher, key))
    }

    pub fn encode(&self, value: &str, opts: &SessionOptions) -> Result<String> {
        if !opts.encryption_enabled {
            return Ok(value.to_string());
        }
        let (cipher, key) = self.keyed(opts)?;
        Ok(cipher.encrypt(value, key)?)
    }

    pub fn decode(&self, value: &str, opts: &SessionOptions) -> Result<String> {
        if !opts.encryption_enabled {
            return Ok(value.to_string());
        }
        let (cipher, key) = self.keyed(opts)?;
        Ok(cipher.decrypt(value, key)?)
    }
}
