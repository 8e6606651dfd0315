use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct KdfParams {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl KdfParams {
    pub fn for_test() -> Self {
        Self {
            m_cost_kib: 1024,
            t_cost: 1,
            p_cost: 1,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost_kib: 8 * 1024,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

fn derive_hash(password: &str, salt: &[u8], params: &KdfParams) -> Result<[u8; 32]> {
    let argon_params = Params::new(params.m_cost_kib, params.t_cost, params.p_cost, Some(32))
        .map_err(|_| Error::OperationFailed("argon2 params".into()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|_| Error::OperationFailed("argon2 hash".into()))?;
    Ok(output)
}

/// Hash a password with a fresh random salt. Returns `(salt_b64, hash_b64)`,
/// both stored alongside the account row.
pub fn hash_password(password: &str, params: &KdfParams) -> Result<(String, String)> {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);

    let hash = derive_hash(password, &salt, params)?;
    Ok((B64.encode(salt), B64.encode(hash)))
}

pub fn verify_password(
    password: &str,
    salt_b64: &str,
    hash_b64: &str,
    params: &KdfParams,
) -> Result<bool> {
    let salt = B64
        .decode(salt_b64)
        .map_err(|_| Error::OperationFailed("invalid stored salt".into()))?;
    let expected = B64
        .decode(hash_b64)
        .map_err(|_| Error::OperationFailed("invalid stored hash".into()))?;
    if expected.len() != 32 {
        return Err(Error::OperationFailed("invalid stored hash length".into()));
    }

    let derived = derive_hash(password, &salt, params)?;
    Ok(derived[..] == expected[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let params = KdfParams::for_test();
        let (salt, hash) = hash_password("hunter2", &params).expect("hash");
        assert!(verify_password("hunter2", &salt, &hash, &params).expect("verify"));
        assert!(!verify_password("hunter3", &salt, &hash, &params).expect("verify"));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        let params = KdfParams::for_test();
        let (salt_a, _) = hash_password("pw", &params).expect("hash");
        let (salt_b, _) = hash_password("pw", &params).expect("hash");
        assert_ne!(salt_a, salt_b);
    }
}
