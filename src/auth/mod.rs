//! Identity and session verification.
//!
//! Turns a bearer token into an authenticated [`Principal`] with a valid
//! workspace context, or fails `Unauthenticated`. Tokens issued at or before
//! the account's last password change are rejected.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::crypto::{self, KdfParams};
use crate::db::{self, accounts, Account, Principal};
use crate::error::{Error, Result};
use crate::workspace;

pub mod token;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret: Vec<u8>,
    pub token_ttl_secs: i64,
    pub kdf: KdfParams,
}

impl AuthConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs: 24 * 60 * 60,
            kdf: KdfParams::default(),
        }
    }

    pub fn for_test() -> Self {
        Self {
            secret: b"dayboard-test-secret".to_vec(),
            token_ttl_secs: 60 * 60,
            kdf: KdfParams::for_test(),
        }
    }
}

fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("email", "a valid email is required"));
    }
    Ok(email)
}

/// Create an account with its default workspace in one transaction. After
/// signup the account owns exactly one workspace and points at it.
pub fn signup(
    conn: &Connection,
    config: &AuthConfig,
    display_name: &str,
    email: &str,
    password: &str,
) -> Result<Account> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(Error::validation("display_name", "name must not be empty"));
    }
    let email = normalize_email(email)?;
    if password.is_empty() {
        return Err(Error::validation("password", "password must not be empty"));
    }

    let (salt, hash) = crypto::hash_password(password, &config.kdf)?;

    db::immediate_tx(conn, || {
        let account = accounts::create_account(conn, display_name, &email, &salt, &hash)?;
        let ws = workspace::create_default_workspace(conn, &account.id)?;
        accounts::set_current_workspace(conn, &account.id, &ws.id)?;

        Ok(Account {
            current_workspace_id: Some(ws.id),
            ..account
        })
    })
}

/// Verify credentials and issue a bearer token. Unknown email and wrong
/// password are indistinguishable.
pub fn login(conn: &Connection, config: &AuthConfig, email: &str, password: &str) -> Result<String> {
    let email = normalize_email(email)?;

    let account =
        accounts::get_account_by_email(conn, &email)?.ok_or(Error::Unauthenticated)?;
    let ok = crypto::verify_password(
        password,
        &account.password_salt,
        &account.password_hash,
        &config.kdf,
    )?;
    if !ok {
        return Err(Error::Unauthenticated);
    }

    token::issue(&config.secret, &account.id, config.token_ttl_secs)
}

/// Re-hash with a fresh salt and record the change time. Every token issued
/// at or before this instant becomes stale.
pub fn change_password(
    conn: &Connection,
    config: &AuthConfig,
    account_id: &str,
    new_password: &str,
) -> Result<()> {
    if new_password.is_empty() {
        return Err(Error::validation("password", "password must not be empty"));
    }

    let (salt, hash) = crypto::hash_password(new_password, &config.kdf)?;
    accounts::set_password(conn, account_id, &salt, &hash)
}

fn spawn_last_active_update(app_dir: PathBuf, account_id: String) {
    // Fire-and-forget on its own connection. The request never waits on this
    // and never fails because of it.
    std::thread::spawn(move || match db::open(&app_dir) {
        Ok(conn) => {
            if let Err(e) = accounts::touch_last_active(&conn, &account_id) {
                log::warn!("last-active update failed for account {account_id}: {e}");
            }
        }
        Err(e) => {
            log::warn!("last-active update could not open db: {e}");
        }
    });
}

/// Authenticate a request. On success the returned principal carries a
/// workspace guaranteed to exist and be owned by the account, healed by the
/// workspace resolver if the stored context was missing or dangling.
pub fn verify(
    conn: &Connection,
    app_dir: &Path,
    config: &AuthConfig,
    bearer_token: &str,
) -> Result<Principal> {
    let claims = token::verify(&config.secret, bearer_token)?;

    let account = accounts::get_account(conn, &claims.sub)?.ok_or(Error::Unauthenticated)?;

    // A password change at or after issuance invalidates the token, even on
    // an exact timestamp tie.
    if let Some(changed_at_ms) = account.password_changed_at_ms {
        let issued_at_ms = claims.iat.saturating_mul(1000);
        if changed_at_ms >= issued_at_ms {
            return Err(Error::Unauthenticated);
        }
    }

    spawn_last_active_update(app_dir.to_path_buf(), account.id.clone());

    let workspace_id = workspace::resolve(conn, &account)?;
    Ok(Principal {
        account_id: account.id,
        workspace_id,
    })
}
