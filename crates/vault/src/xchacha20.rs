//! XChaCha20-Poly1305 implementation of [`KeyCipher`].

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore;

use crate::{error::VaultError, traits::KeyCipher};

/// Version tag for XChaCha20-Poly1305 blobs.
pub const VERSION_TAG: u8 = 0x01;

/// Extended nonce length (24 bytes).
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// XChaCha20-Poly1305 AEAD cipher.
///
/// Output layout: `[nonce: 24][ciphertext: N][tag: 16]`. The extended nonce
/// is large enough to be drawn at random for every message.
pub struct XChaCha20Poly1305Cipher;

fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

impl KeyCipher for XChaCha20Poly1305Cipher {
    fn version_tag(&self) -> u8 {
        VERSION_TAG
    }

    #[allow(deprecated)]
    fn encrypt(&self, key: &[u8; 32], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce_bytes = random_nonce();
        let sealed = XChaCha20Poly1305::new(key.into())
            .encrypt(XNonce::from_slice(&nonce_bytes), Payload {
                msg: plaintext,
                aad,
            })
            .map_err(|e| VaultError::CipherError(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    #[allow(deprecated)]
    fn decrypt(
        &self,
        key: &[u8; 32],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, VaultError> {
        let min = NONCE_LEN + TAG_LEN;
        if ciphertext.len() < min {
            return Err(VaultError::Truncated {
                len: ciphertext.len(),
                min,
            });
        }

        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);
        XChaCha20Poly1305::new(key.into())
            .decrypt(XNonce::from_slice(nonce_bytes), Payload { msg: sealed, aad })
            .map_err(|e| VaultError::CipherError(e.to_string()))
    }
}
