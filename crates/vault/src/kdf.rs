//! Argon2id stretching of a passphrase into a 256-bit key.

use {argon2::Argon2, rand::RngCore, zeroize::Zeroizing};

use crate::error::VaultError;

/// Salt length written in front of every passphrase-encrypted value.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of passes.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    /// 19 MiB, two passes: runs once per stored value, so lighter than an
    /// unlock-once password KDF.
    fn default() -> Self {
        Self {
            m_cost: 19 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

/// Derive a 256-bit key from `passphrase` and `salt`.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, VaultError> {
    let argon2_params = argon2::Params::new(params.m_cost, params.t_cost, params.p_cost, Some(32))
        .map_err(|e| VaultError::CipherError(format!("invalid KDF params: {e}")))?;

    let mut key = Zeroizing::new([0u8; 32]);
    Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    )
    .hash_password_into(passphrase, salt, key.as_mut())
    .map_err(|e| VaultError::CipherError(format!("KDF failed: {e}")))?;

    Ok(key)
}

/// Fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const CHEAP: KdfParams = KdfParams {
        m_cost: 256,
        t_cost: 1,
        p_cost: 1,
    };

    #[test]
    fn same_inputs_same_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(b"passphrase", &salt, &CHEAP).unwrap();
        let b = derive_key(b"passphrase", &salt, &CHEAP).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn passphrase_changes_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(b"one", &salt, &CHEAP).unwrap();
        let b = derive_key(b"two", &salt, &CHEAP).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn salt_changes_key() {
        let a = derive_key(b"passphrase", &[1u8; SALT_LEN], &CHEAP).unwrap();
        let b = derive_key(b"passphrase", &[2u8; SALT_LEN], &CHEAP).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn invalid_params_are_reported() {
        let params = KdfParams {
            m_cost: 1,
            t_cost: 0,
            p_cost: 1,
        };
        let err = derive_key(b"p", &[0u8; SALT_LEN], &params).unwrap_err();
        assert!(matches!(err, VaultError::CipherError(msg) if msg.starts_with("invalid KDF params")));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn params_serialize() {
        let json = serde_json::to_string(&KdfParams::default()).unwrap();
        let parsed: KdfParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, KdfParams::default());
    }
}
