//! Multi-collection mutations that must commit or roll back as a unit.
//!
//! Every operation here runs inside one `BEGIN IMMEDIATE` transaction via
//! [`immediate_tx`](super::immediate_tx); readers on other connections see
//! either the pre-cascade or post-cascade state, never a partial one.

use rusqlite::{params, Connection};

use super::{accounts, backlog, immediate_tx, todos, workspaces, BacklogItem, Principal, Todo};
use crate::error::{Error, Result};

fn delete_workspace_rows(conn: &Connection, owner_id: &str, workspace_id: &str) -> Result<()> {
    conn.execute(
        r#"DELETE FROM categories WHERE owner_id = ?1 AND workspace_id = ?2"#,
        params![owner_id, workspace_id],
    )?;
    conn.execute(
        r#"DELETE FROM todos WHERE owner_id = ?1 AND workspace_id = ?2"#,
        params![owner_id, workspace_id],
    )?;
    conn.execute(
        r#"DELETE FROM backlog_items WHERE owner_id = ?1 AND workspace_id = ?2"#,
        params![owner_id, workspace_id],
    )?;
    conn.execute(
        r#"DELETE FROM memos WHERE owner_id = ?1 AND workspace_id = ?2"#,
        params![owner_id, workspace_id],
    )?;
    Ok(())
}

/// Delete a workspace and everything scoped to it. The owner's last
/// workspace cannot be deleted; if the deleted workspace was current, the
/// account is pointed at some other owned workspace before commit.
pub fn delete_workspace(conn: &Connection, account_id: &str, workspace_id: &str) -> Result<()> {
    immediate_tx(conn, || {
        let workspace = workspaces::get_owned(conn, workspace_id, account_id)?
            .ok_or(Error::NotFound("workspace"))?;

        if workspaces::count_owned(conn, account_id)? < 2 {
            return Err(Error::InvalidOperation(
                "cannot delete last workspace".to_string(),
            ));
        }

        delete_workspace_rows(conn, account_id, &workspace.id)?;
        conn.execute(
            r#"DELETE FROM workspaces WHERE id = ?1 AND owner_id = ?2"#,
            params![workspace.id, account_id],
        )?;

        let account =
            accounts::get_account(conn, account_id)?.ok_or(Error::NotFound("account"))?;
        if account.current_workspace_id.as_deref() == Some(workspace.id.as_str()) {
            let replacement = workspaces::another_owned(conn, account_id, &workspace.id)?
                .ok_or_else(|| Error::OperationFailed("no replacement workspace".to_string()))?;
            accounts::set_current_workspace(conn, account_id, &replacement.id)?;
        }

        Ok(())
    })
}

/// Delete a category and null out every weak reference to it. Dependent
/// memos and backlog items survive with `category_id = NULL`.
pub fn delete_category(conn: &Connection, principal: &Principal, category_id: &str) -> Result<()> {
    immediate_tx(conn, || {
        let changed = conn.execute(
            r#"DELETE FROM categories WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3"#,
            params![category_id, principal.account_id, principal.workspace_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound("category"));
        }

        conn.execute(
            r#"
UPDATE memos SET category_id = NULL
WHERE category_id = ?1 AND owner_id = ?2 AND workspace_id = ?3
"#,
            params![category_id, principal.account_id, principal.workspace_id],
        )?;
        conn.execute(
            r#"
UPDATE backlog_items SET category_id = NULL
WHERE category_id = ?1 AND owner_id = ?2 AND workspace_id = ?3
"#,
            params![category_id, principal.account_id, principal.workspace_id],
        )?;

        Ok(())
    })
}

/// Delete an account and every workspace it owns, one workspace at a time,
/// all inside a single transaction.
pub fn delete_account(conn: &Connection, account_id: &str) -> Result<()> {
    immediate_tx(conn, || {
        let account =
            accounts::get_account(conn, account_id)?.ok_or(Error::NotFound("account"))?;

        for workspace in workspaces::list_owned(conn, &account.id)? {
            delete_workspace_rows(conn, &account.id, &workspace.id)?;
        }
        conn.execute(
            r#"DELETE FROM workspaces WHERE owner_id = ?1"#,
            params![account.id],
        )?;
        conn.execute(r#"DELETE FROM accounts WHERE id = ?1"#, params![account.id])?;

        Ok(())
    })
}

/// Detach a scheduled todo from its date and park it on the backlog. The new
/// backlog item starts uncategorized.
pub fn move_todo_to_backlog(
    conn: &Connection,
    principal: &Principal,
    todo_id: &str,
) -> Result<BacklogItem> {
    immediate_tx(conn, || {
        let todo =
            todos::get_todo(conn, principal, todo_id)?.ok_or(Error::NotFound("todo"))?;

        let item = backlog::create_backlog_item(
            conn,
            principal,
            &todo.text,
            &todo.description,
            &todo.sub_items,
            todo.priority,
            None,
        )?;
        if todo.completed {
            conn.execute(
                r#"UPDATE backlog_items SET completed = 1 WHERE id = ?1"#,
                params![item.id],
            )?;
        }
        todos::delete_todo(conn, principal, &todo.id)?;

        Ok(BacklogItem {
            completed: todo.completed,
            ..item
        })
    })
}

/// Schedule a backlog item onto a concrete date. The category link does not
/// survive the move; todos never carry categories.
pub fn move_backlog_to_todo(
    conn: &Connection,
    principal: &Principal,
    item_id: &str,
    date: &str,
) -> Result<Todo> {
    if date.trim().is_empty() {
        return Err(Error::validation("date", "date required"));
    }

    immediate_tx(conn, || {
        let item = backlog::get_backlog_item(conn, principal, item_id)?
            .ok_or(Error::NotFound("backlog item"))?;

        let todo = todos::create_todo(
            conn,
            principal,
            &item.text,
            date,
            &item.description,
            &item.sub_items,
            item.priority,
        )?;
        if item.completed {
            conn.execute(
                r#"UPDATE todos SET completed = 1 WHERE id = ?1"#,
                params![todo.id],
            )?;
        }
        backlog::delete_backlog_item(conn, principal, &item.id)?;

        Ok(Todo {
            completed: item.completed,
            ..todo
        })
    })
}
