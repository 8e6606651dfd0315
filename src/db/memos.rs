use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{new_id, now_ms, Memo, Principal};
use crate::error::{Error, Result};

fn memo_from_row(row: &Row<'_>) -> rusqlite::Result<Memo> {
    Ok(Memo {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        workspace_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        last_edited_ms: row.get(5)?,
        category_id: row.get(6)?,
    })
}

const MEMO_COLUMNS: &str = "id, owner_id, workspace_id, title, content, last_edited_ms, category_id";

pub fn create_memo(
    conn: &Connection,
    principal: &Principal,
    title: &str,
    content: &str,
    category_id: Option<&str>,
) -> Result<Memo> {
    if title.trim().is_empty() {
        return Err(Error::validation("title", "title must not be empty"));
    }

    let id = new_id();
    let now = now_ms();
    conn.execute(
        r#"
INSERT INTO memos (id, owner_id, workspace_id, title, content, last_edited_ms, category_id)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#,
        params![
            id,
            principal.account_id,
            principal.workspace_id,
            title,
            content,
            now,
            category_id,
        ],
    )?;

    Ok(Memo {
        id,
        owner_id: principal.account_id.clone(),
        workspace_id: principal.workspace_id.clone(),
        title: title.to_string(),
        content: content.to_string(),
        last_edited_ms: now,
        category_id: category_id.map(str::to_string),
    })
}

pub fn get_memo(conn: &Connection, principal: &Principal, id: &str) -> Result<Option<Memo>> {
    let memo = conn
        .query_row(
            &format!(
                "SELECT {MEMO_COLUMNS} FROM memos \
                 WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3"
            ),
            params![id, principal.account_id, principal.workspace_id],
            memo_from_row,
        )
        .optional()?;
    Ok(memo)
}

pub fn list_memos(conn: &Connection, principal: &Principal) -> Result<Vec<Memo>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMO_COLUMNS} FROM memos \
         WHERE owner_id = ?1 AND workspace_id = ?2 ORDER BY last_edited_ms DESC"
    ))?;

    let mut rows = stmt.query(params![principal.account_id, principal.workspace_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(memo_from_row(row)?);
    }
    Ok(result)
}

pub fn update_memo(
    conn: &Connection,
    principal: &Principal,
    id: &str,
    title: &str,
    content: &str,
    category_id: Option<&str>,
) -> Result<Memo> {
    if title.trim().is_empty() {
        return Err(Error::validation("title", "title must not be empty"));
    }

    let changed = conn.execute(
        r#"
UPDATE memos
SET title = ?4, content = ?5, last_edited_ms = ?6, category_id = ?7
WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3
"#,
        params![
            id,
            principal.account_id,
            principal.workspace_id,
            title,
            content,
            now_ms(),
            category_id,
        ],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("memo"));
    }

    get_memo(conn, principal, id)?.ok_or(Error::NotFound("memo"))
}

pub fn delete_memo(conn: &Connection, principal: &Principal, id: &str) -> Result<()> {
    let changed = conn.execute(
        r#"DELETE FROM memos WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3"#,
        params![id, principal.account_id, principal.workspace_id],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("memo"));
    }
    Ok(())
}
