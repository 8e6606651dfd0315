use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{new_id, now_ms, Account};
use crate::error::Result;

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        password_salt: row.get(4)?,
        current_workspace_id: row.get(5)?,
        password_changed_at_ms: row.get(6)?,
        last_active_at_ms: row.get(7)?,
        created_at_ms: row.get(8)?,
        updated_at_ms: row.get(9)?,
    })
}

const ACCOUNT_COLUMNS: &str = "id, display_name, email, password_hash, password_salt, \
    current_workspace_id, password_changed_at_ms, last_active_at_ms, created_at_ms, updated_at_ms";

pub fn create_account(
    conn: &Connection,
    display_name: &str,
    email: &str,
    password_salt: &str,
    password_hash: &str,
) -> Result<Account> {
    let id = new_id();
    let now = now_ms();

    conn.execute(
        r#"
INSERT INTO accounts (id, display_name, email, password_hash, password_salt, created_at_ms, updated_at_ms)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#,
        params![id, display_name, email, password_hash, password_salt, now, now],
    )?;

    Ok(Account {
        id,
        display_name: display_name.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        password_salt: password_salt.to_string(),
        current_workspace_id: None,
        password_changed_at_ms: None,
        last_active_at_ms: None,
        created_at_ms: now,
        updated_at_ms: now,
    })
}

pub fn get_account(conn: &Connection, id: &str) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
            params![id],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

pub fn get_account_by_email(conn: &Connection, email: &str) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
            params![email],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

pub fn set_current_workspace(conn: &Connection, account_id: &str, workspace_id: &str) -> Result<()> {
    conn.execute(
        r#"UPDATE accounts SET current_workspace_id = ?2, updated_at_ms = ?3 WHERE id = ?1"#,
        params![account_id, workspace_id, now_ms()],
    )?;
    Ok(())
}

/// Rewrites the stored hash and marks the change time; tokens issued at or
/// before that instant stop being accepted.
pub fn set_password(
    conn: &Connection,
    account_id: &str,
    password_salt: &str,
    password_hash: &str,
) -> Result<()> {
    let now = now_ms();
    conn.execute(
        r#"
UPDATE accounts
SET password_hash = ?2, password_salt = ?3, password_changed_at_ms = ?4, updated_at_ms = ?4
WHERE id = ?1
"#,
        params![account_id, password_hash, password_salt, now],
    )?;
    Ok(())
}

pub fn touch_last_active(conn: &Connection, account_id: &str) -> Result<()> {
    conn.execute(
        r#"UPDATE accounts SET last_active_at_ms = ?2 WHERE id = ?1"#,
        params![account_id, now_ms()],
    )?;
    Ok(())
}
