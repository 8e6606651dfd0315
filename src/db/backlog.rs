use rusqlite::{params, Connection, OptionalExtension};

use super::{decode_sub_items, encode_sub_items, new_id, BacklogItem, Principal, Priority, SubItem};
use crate::error::{Error, Result};

type BacklogRow = (
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
    String,
    Option<String>,
);

fn backlog_from_raw(raw: BacklogRow) -> Result<BacklogItem> {
    let (id, owner_id, workspace_id, text, completed, description, sub_items, priority, category_id) =
        raw;
    Ok(BacklogItem {
        id,
        owner_id,
        workspace_id,
        text,
        completed: completed != 0,
        description,
        sub_items: decode_sub_items(&sub_items)?,
        priority: Priority::parse(&priority)?,
        category_id,
    })
}

const BACKLOG_COLUMNS: &str =
    "id, owner_id, workspace_id, text, completed, description, sub_items, priority, category_id";

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<BacklogRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

#[allow(clippy::too_many_arguments)]
pub fn create_backlog_item(
    conn: &Connection,
    principal: &Principal,
    text: &str,
    description: &str,
    sub_items: &[SubItem],
    priority: Priority,
    category_id: Option<&str>,
) -> Result<BacklogItem> {
    if text.trim().is_empty() {
        return Err(Error::validation("text", "text must not be empty"));
    }

    let id = new_id();
    let sub_items_json = encode_sub_items(sub_items)?;
    conn.execute(
        r#"
INSERT INTO backlog_items (id, owner_id, workspace_id, text, completed, description, sub_items, priority, category_id)
VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8)
"#,
        params![
            id,
            principal.account_id,
            principal.workspace_id,
            text,
            description,
            sub_items_json,
            priority.as_str(),
            category_id,
        ],
    )?;

    Ok(BacklogItem {
        id,
        owner_id: principal.account_id.clone(),
        workspace_id: principal.workspace_id.clone(),
        text: text.to_string(),
        completed: false,
        description: description.to_string(),
        sub_items: sub_items.to_vec(),
        priority,
        category_id: category_id.map(str::to_string),
    })
}

pub fn get_backlog_item(
    conn: &Connection,
    principal: &Principal,
    id: &str,
) -> Result<Option<BacklogItem>> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {BACKLOG_COLUMNS} FROM backlog_items \
                 WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3"
            ),
            params![id, principal.account_id, principal.workspace_id],
            read_raw,
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(Some(backlog_from_raw(raw)?)),
        None => Ok(None),
    }
}

pub fn list_backlog_items(conn: &Connection, principal: &Principal) -> Result<Vec<BacklogItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BACKLOG_COLUMNS} FROM backlog_items \
         WHERE owner_id = ?1 AND workspace_id = ?2 ORDER BY text ASC"
    ))?;

    let mut rows = stmt.query(params![principal.account_id, principal.workspace_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(backlog_from_raw(read_raw(row)?)?);
    }
    Ok(result)
}

#[allow(clippy::too_many_arguments)]
pub fn update_backlog_item(
    conn: &Connection,
    principal: &Principal,
    id: &str,
    text: &str,
    completed: bool,
    description: &str,
    sub_items: &[SubItem],
    priority: Priority,
    category_id: Option<&str>,
) -> Result<BacklogItem> {
    if text.trim().is_empty() {
        return Err(Error::validation("text", "text must not be empty"));
    }

    let sub_items_json = encode_sub_items(sub_items)?;
    let changed = conn.execute(
        r#"
UPDATE backlog_items
SET text = ?4, completed = ?5, description = ?6, sub_items = ?7, priority = ?8, category_id = ?9
WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3
"#,
        params![
            id,
            principal.account_id,
            principal.workspace_id,
            text,
            completed as i64,
            description,
            sub_items_json,
            priority.as_str(),
            category_id,
        ],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("backlog item"));
    }

    get_backlog_item(conn, principal, id)?.ok_or(Error::NotFound("backlog item"))
}

pub fn delete_backlog_item(conn: &Connection, principal: &Principal, id: &str) -> Result<()> {
    let changed = conn.execute(
        r#"DELETE FROM backlog_items WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3"#,
        params![id, principal.account_id, principal.workspace_id],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("backlog item"));
    }
    Ok(())
}
