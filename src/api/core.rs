//! Transport-facing entry points.
//!
//! Each call opens its own connection, authenticates, and runs one core
//! operation. Failures come back as [`Error`](crate::Error); the transport
//! maps `Error::status_code()` and `Error::body()` onto the wire.

use std::path::Path;

use crate::auth::{self, AuthConfig};
use crate::db::{self, cascade, Account, BacklogItem, Principal, Todo};
use crate::error::Result;

pub fn signup(
    app_dir: &Path,
    config: &AuthConfig,
    display_name: &str,
    email: &str,
    password: &str,
) -> Result<Account> {
    let conn = db::open(app_dir)?;
    auth::signup(&conn, config, display_name, email, password)
}

pub fn login(app_dir: &Path, config: &AuthConfig, email: &str, password: &str) -> Result<String> {
    let conn = db::open(app_dir)?;
    auth::login(&conn, config, email, password)
}

/// Per-request authentication: token → principal with a valid workspace.
pub fn authenticate(app_dir: &Path, config: &AuthConfig, bearer_token: &str) -> Result<Principal> {
    let conn = db::open(app_dir)?;
    auth::verify(&conn, app_dir, config, bearer_token)
}

pub fn change_password(
    app_dir: &Path,
    config: &AuthConfig,
    bearer_token: &str,
    new_password: &str,
) -> Result<()> {
    let conn = db::open(app_dir)?;
    let principal = auth::verify(&conn, app_dir, config, bearer_token)?;
    auth::change_password(&conn, config, &principal.account_id, new_password)
}

pub fn delete_workspace(
    app_dir: &Path,
    config: &AuthConfig,
    bearer_token: &str,
    workspace_id: &str,
) -> Result<()> {
    let conn = db::open(app_dir)?;
    let principal = auth::verify(&conn, app_dir, config, bearer_token)?;
    cascade::delete_workspace(&conn, &principal.account_id, workspace_id)
}

pub fn delete_category(
    app_dir: &Path,
    config: &AuthConfig,
    bearer_token: &str,
    category_id: &str,
) -> Result<()> {
    let conn = db::open(app_dir)?;
    let principal = auth::verify(&conn, app_dir, config, bearer_token)?;
    cascade::delete_category(&conn, &principal, category_id)
}

pub fn delete_account(app_dir: &Path, config: &AuthConfig, bearer_token: &str) -> Result<()> {
    let conn = db::open(app_dir)?;
    let principal = auth::verify(&conn, app_dir, config, bearer_token)?;
    cascade::delete_account(&conn, &principal.account_id)
}

pub fn move_todo_to_backlog(
    app_dir: &Path,
    config: &AuthConfig,
    bearer_token: &str,
    todo_id: &str,
) -> Result<BacklogItem> {
    let conn = db::open(app_dir)?;
    let principal = auth::verify(&conn, app_dir, config, bearer_token)?;
    cascade::move_todo_to_backlog(&conn, &principal, todo_id)
}

pub fn move_backlog_to_todo(
    app_dir: &Path,
    config: &AuthConfig,
    bearer_token: &str,
    item_id: &str,
    date: &str,
) -> Result<Todo> {
    let conn = db::open(app_dir)?;
    let principal = auth::verify(&conn, app_dir, config, bearer_token)?;
    cascade::move_backlog_to_todo(&conn, &principal, item_id, date)
}
