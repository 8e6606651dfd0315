use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{new_id, Category, Principal};
use crate::error::{Error, Result};

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        workspace_id: row.get(2)?,
        name: row.get(3)?,
        color: row.get(4)?,
    })
}

pub fn create_category(
    conn: &Connection,
    principal: &Principal,
    name: &str,
    color: &str,
) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "name must not be empty"));
    }

    let id = new_id();
    conn.execute(
        r#"
INSERT INTO categories (id, owner_id, workspace_id, name, color)
VALUES (?1, ?2, ?3, ?4, ?5)
"#,
        params![
            id,
            principal.account_id,
            principal.workspace_id,
            name,
            color
        ],
    )?;

    Ok(Category {
        id,
        owner_id: principal.account_id.clone(),
        workspace_id: principal.workspace_id.clone(),
        name: name.to_string(),
        color: color.to_string(),
    })
}

pub fn get_category(
    conn: &Connection,
    principal: &Principal,
    id: &str,
) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            r#"
SELECT id, owner_id, workspace_id, name, color
FROM categories
WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3
"#,
            params![id, principal.account_id, principal.workspace_id],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

pub fn list_categories(conn: &Connection, principal: &Principal) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        r#"
SELECT id, owner_id, workspace_id, name, color
FROM categories
WHERE owner_id = ?1 AND workspace_id = ?2
ORDER BY name ASC
"#,
    )?;

    let mut rows = stmt.query(params![principal.account_id, principal.workspace_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(category_from_row(row)?);
    }
    Ok(result)
}

pub fn update_category(
    conn: &Connection,
    principal: &Principal,
    id: &str,
    name: &str,
    color: &str,
) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "name must not be empty"));
    }

    let changed = conn.execute(
        r#"
UPDATE categories SET name = ?4, color = ?5
WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3
"#,
        params![id, principal.account_id, principal.workspace_id, name, color],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("category"));
    }

    get_category(conn, principal, id)?.ok_or(Error::NotFound("category"))
}
