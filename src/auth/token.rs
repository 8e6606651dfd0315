use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bearer token claims. `sub` is the account id; `iat`/`exp` are seconds
/// since the epoch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .try_into()
        .unwrap_or(i64::MAX)
}

pub fn issue(secret: &[u8], account_id: &str, ttl_secs: i64) -> Result<String> {
    let now = now_secs();
    let claims = Claims {
        sub: account_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| Error::OperationFailed(format!("token encode failed: {e}")))
}

/// Decode and validate signature and expiry. Every decode failure collapses
/// into `Unauthenticated`; callers get no hint about what was wrong.
pub fn verify(secret: &[u8], token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrip() {
        let token = issue(b"secret", "acct-1", 3600).expect("issue");
        let claims = verify(b"secret", &token).expect("verify");
        assert_eq!(claims.sub, "acct-1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_unauthenticated() {
        let token = issue(b"secret", "acct-1", 3600).expect("issue");
        assert!(matches!(
            verify(b"other", &token),
            Err(Error::Unauthenticated)
        ));
    }

    #[test]
    fn garbage_is_unauthenticated() {
        assert!(matches!(
            verify(b"secret", "not.a.token"),
            Err(Error::Unauthenticated)
        ));
    }
}
