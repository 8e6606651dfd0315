//! Self-healing workspace resolution.
//!
//! Every authenticated request must end up with a workspace that exists and
//! is owned by the requesting account. Clients never manage this invariant;
//! a missing or dangling `current_workspace_id` is repaired here, silently,
//! before any handler runs.

use rusqlite::Connection;

use crate::db::{self, accounts, workspaces, Account, Workspace};
use crate::error::{Error, Result};

pub const DEFAULT_WORKSPACE_NAME: &str = "My Workspace";
pub const DEFAULT_WORKSPACE_DESCRIPTION: &str = "Default workspace";

pub fn create_default_workspace(conn: &Connection, owner_id: &str) -> Result<Workspace> {
    workspaces::create_workspace(
        conn,
        owner_id,
        DEFAULT_WORKSPACE_NAME,
        DEFAULT_WORKSPACE_DESCRIPTION,
    )
}

/// Resolve the account's workspace context, repairing it if needed.
///
/// Deterministic, in order:
/// 1. the stored `current_workspace_id`, when it points at a workspace this
///    account owns;
/// 2. otherwise the most recently updated workspace the account owns, which
///    is persisted as the new current workspace;
/// 3. otherwise a freshly created default workspace.
///
/// Idempotent: a second call with the same stale state lands on the same
/// workspace the first call healed to. Corrective writes that fail surface
/// as `OperationFailed`; the repair itself is never reported to the caller.
pub fn resolve(conn: &Connection, account: &Account) -> Result<String> {
    if let Some(current) = &account.current_workspace_id {
        if workspaces::get_owned(conn, current, &account.id)?.is_some() {
            return Ok(current.clone());
        }
        log::debug!(
            "account {} carries dangling workspace {current}, repairing",
            account.id
        );
    }

    db::immediate_tx(conn, || {
        // Re-check inside the transaction; a concurrent request may have
        // healed the same account already.
        let fresh =
            accounts::get_account(conn, &account.id)?.ok_or(Error::NotFound("account"))?;
        if let Some(current) = &fresh.current_workspace_id {
            if workspaces::get_owned(conn, current, &fresh.id)?.is_some() {
                return Ok(current.clone());
            }
        }

        let workspace = match workspaces::latest_owned(conn, &fresh.id)? {
            Some(existing) => existing,
            None => create_default_workspace(conn, &fresh.id)?,
        };
        accounts::set_current_workspace(conn, &fresh.id, &workspace.id)?;
        Ok(workspace.id)
    })
}
