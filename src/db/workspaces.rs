use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{new_id, now_ms, Workspace};
use crate::error::{Error, Result};

fn workspace_from_row(row: &Row<'_>) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        created_at_ms: row.get(4)?,
        updated_at_ms: row.get(5)?,
    })
}

const WORKSPACE_COLUMNS: &str = "id, name, description, owner_id, created_at_ms, updated_at_ms";

pub fn create_workspace(
    conn: &Connection,
    owner_id: &str,
    name: &str,
    description: &str,
) -> Result<Workspace> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "name must not be empty"));
    }

    let id = new_id();
    let now = now_ms();
    conn.execute(
        r#"
INSERT INTO workspaces (id, name, description, owner_id, created_at_ms, updated_at_ms)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#,
        params![id, name, description, owner_id, now, now],
    )?;

    Ok(Workspace {
        id,
        name: name.to_string(),
        description: description.to_string(),
        owner_id: owner_id.to_string(),
        created_at_ms: now,
        updated_at_ms: now,
    })
}

/// Lookup scoped to the owner. A workspace that exists but belongs to someone
/// else comes back as `None`.
pub fn get_owned(conn: &Connection, id: &str, owner_id: &str) -> Result<Option<Workspace>> {
    let workspace = conn
        .query_row(
            &format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = ?1 AND owner_id = ?2"),
            params![id, owner_id],
            workspace_from_row,
        )
        .optional()?;
    Ok(workspace)
}

pub fn list_owned(conn: &Connection, owner_id: &str) -> Result<Vec<Workspace>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE owner_id = ?1 \
         ORDER BY updated_at_ms DESC, created_at_ms DESC"
    ))?;

    let mut rows = stmt.query(params![owner_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(workspace_from_row(row)?);
    }
    Ok(result)
}

/// Most recently updated workspace owned by the account, creation time as
/// tiebreak. This is the resolver's healing preference.
pub fn latest_owned(conn: &Connection, owner_id: &str) -> Result<Option<Workspace>> {
    let workspace = conn
        .query_row(
            &format!(
                "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE owner_id = ?1 \
                 ORDER BY updated_at_ms DESC, created_at_ms DESC LIMIT 1"
            ),
            params![owner_id],
            workspace_from_row,
        )
        .optional()?;
    Ok(workspace)
}

/// Some owned workspace other than `excluding`, if one exists.
pub fn another_owned(
    conn: &Connection,
    owner_id: &str,
    excluding: &str,
) -> Result<Option<Workspace>> {
    let workspace = conn
        .query_row(
            &format!(
                "SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE owner_id = ?1 AND id != ?2 LIMIT 1"
            ),
            params![owner_id, excluding],
            workspace_from_row,
        )
        .optional()?;
    Ok(workspace)
}

pub fn count_owned(conn: &Connection, owner_id: &str) -> Result<i64> {
    let count = conn.query_row(
        r#"SELECT COUNT(*) FROM workspaces WHERE owner_id = ?1"#,
        params![owner_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn update_workspace(
    conn: &Connection,
    owner_id: &str,
    id: &str,
    name: &str,
    description: &str,
) -> Result<Workspace> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "name must not be empty"));
    }

    let changed = conn.execute(
        r#"
UPDATE workspaces SET name = ?3, description = ?4, updated_at_ms = ?5
WHERE id = ?1 AND owner_id = ?2
"#,
        params![id, owner_id, name, description, now_ms()],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("workspace"));
    }

    get_owned(conn, id, owner_id)?.ok_or(Error::NotFound("workspace"))
}
