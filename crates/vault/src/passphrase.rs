//! Passphrase encryption of single string values.
//!
//! Blob layout, base64-encoded:
//!
//! ```text
//! [version: 1][salt: 16][nonce || ciphertext || tag]
//! ```
//!
//! The version byte and salt are authenticated as associated data, so a blob
//! cannot be re-labelled or re-salted without failing decryption.

use base64::Engine;

use crate::{
    error::VaultError,
    kdf::{self, KdfParams, SALT_LEN},
    traits::{KeyCipher, PassphraseCipher},
    xchacha20::XChaCha20Poly1305Cipher,
};

const HEADER_LEN: usize = 1 + SALT_LEN;

/// [`PassphraseCipher`] over any [`KeyCipher`], XChaCha20-Poly1305 by default.
pub struct XChaCha20PassphraseCipher<C: KeyCipher = XChaCha20Poly1305Cipher> {
    cipher: C,
    params: KdfParams,
}

impl XChaCha20PassphraseCipher<XChaCha20Poly1305Cipher> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(KdfParams::default())
    }

    /// Use custom Argon2id costs. Decryption must use the same costs.
    #[must_use]
    pub fn with_params(params: KdfParams) -> Self {
        Self::with_cipher(XChaCha20Poly1305Cipher, params)
    }
}

impl Default for XChaCha20PassphraseCipher<XChaCha20Poly1305Cipher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: KeyCipher> XChaCha20PassphraseCipher<C> {
    pub fn with_cipher(cipher: C, params: KdfParams) -> Self {
        Self { cipher, params }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }
}

impl<C: KeyCipher> PassphraseCipher for XChaCha20PassphraseCipher<C> {
    fn encrypt(&self, plaintext: &str, passphrase: &str) -> Result<String, VaultError> {
        let salt = kdf::generate_salt();
        let key = kdf::derive_key(passphrase.as_bytes(), &salt, &self.params)?;

        let mut blob = Vec::with_capacity(HEADER_LEN + plaintext.len() + 40);
        blob.push(self.cipher.version_tag());
        blob.extend_from_slice(&salt);

        let sealed = self
            .cipher
            .encrypt(&key, plaintext.as_bytes(), &blob[..HEADER_LEN])?;
        blob.extend_from_slice(&sealed);

        Ok(base64::engine::general_purpose::STANDARD.encode(blob))
    }

    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Result<String, VaultError> {
        let blob = base64::engine::general_purpose::STANDARD.decode(ciphertext)?;
        if blob.len() <= HEADER_LEN {
            return Err(VaultError::Truncated {
                len: blob.len(),
                min: HEADER_LEN + 1,
            });
        }

        let version = blob[0];
        if version != self.cipher.version_tag() {
            return Err(VaultError::UnsupportedVersion(version));
        }

        let (header, sealed) = blob.split_at(HEADER_LEN);
        let key = kdf::derive_key(passphrase.as_bytes(), &header[1..], &self.params)?;
        let plaintext = self.cipher.decrypt(&key, sealed, header).inspect_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %_e, "passphrase decryption failed");
        })?;

        Ok(String::from_utf8(plaintext)?)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn cheap() -> XChaCha20PassphraseCipher {
        XChaCha20PassphraseCipher::with_params(KdfParams {
            m_cost: 256,
            t_cost: 1,
            p_cost: 1,
        })
    }

    #[rstest]
    #[case("hello")]
    #[case("")]
    #[case("ünïcødé ✓")]
    #[case("a much longer value that spans more than one block of keystream output, \
            just to be sure nothing is cut short")]
    fn round_trips(#[case] value: &str) {
        let cipher = cheap();
        let blob = cipher.encrypt(value, "6f1c2f0e-8d1a-4c3b-9a7e-2b5d4c3a1f00").unwrap();
        let back = cipher
            .decrypt(&blob, "6f1c2f0e-8d1a-4c3b-9a7e-2b5d4c3a1f00")
            .unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn output_is_base64_and_salted() {
        let cipher = cheap();
        let a = cipher.encrypt("same", "pw").unwrap();
        let b = cipher.encrypt("same", "pw").unwrap();
        assert_ne!(a, b);
        assert!(
            base64::engine::general_purpose::STANDARD
                .decode(&a)
                .is_ok()
        );
    }

    #[test]
    fn wrong_passphrase_fails() {
        let cipher = cheap();
        let blob = cipher.encrypt("secret", "right").unwrap();
        assert!(matches!(
            cipher.decrypt(&blob, "wrong"),
            Err(VaultError::CipherError(_))
        ));
    }

    #[test]
    fn plaintext_input_is_not_mistaken_for_ciphertext() {
        let cipher = cheap();
        assert!(cipher.decrypt("not base64 at all!", "pw").is_err());
        assert!(matches!(
            cipher.decrypt("AAAA", "pw"),
            Err(VaultError::Truncated { .. })
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let cipher = cheap();
        let blob = cipher.encrypt("secret", "pw").unwrap();
        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(&blob)
            .unwrap();
        raw[0] = 0x7f;
        let relabelled = base64::engine::general_purpose::STANDARD.encode(raw);
        assert!(matches!(
            cipher.decrypt(&relabelled, "pw"),
            Err(VaultError::UnsupportedVersion(0x7f))
        ));
    }

    #[test]
    fn tampered_salt_fails() {
        let cipher = cheap();
        let blob = cipher.encrypt("secret", "pw").unwrap();
        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(&blob)
            .unwrap();
        raw[1] ^= 0x01;
        let tampered = base64::engine::general_purpose::STANDARD.encode(raw);
        assert!(cipher.decrypt(&tampered, "pw").is_err());
    }
}
