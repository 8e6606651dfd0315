use rusqlite::{params, Connection, OptionalExtension};

use super::{decode_sub_items, encode_sub_items, new_id, Principal, Priority, SubItem, Todo};
use crate::error::{Error, Result};

type TodoRow = (
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
    String,
    String,
);

fn todo_from_raw(raw: TodoRow) -> Result<Todo> {
    let (id, owner_id, workspace_id, text, completed, date, description, sub_items, priority) = raw;
    Ok(Todo {
        id,
        owner_id,
        workspace_id,
        text,
        completed: completed != 0,
        date,
        description,
        sub_items: decode_sub_items(&sub_items)?,
        priority: Priority::parse(&priority)?,
    })
}

const TODO_COLUMNS: &str =
    "id, owner_id, workspace_id, text, completed, date, description, sub_items, priority";

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<TodoRow> {
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

pub fn create_todo(
    conn: &Connection,
    principal: &Principal,
    text: &str,
    date: &str,
    description: &str,
    sub_items: &[SubItem],
    priority: Priority,
) -> Result<Todo> {
    if text.trim().is_empty() {
        return Err(Error::validation("text", "text must not be empty"));
    }
    if date.trim().is_empty() {
        return Err(Error::validation("date", "date required"));
    }

    let id = new_id();
    let sub_items_json = encode_sub_items(sub_items)?;
    conn.execute(
        r#"
INSERT INTO todos (id, owner_id, workspace_id, text, completed, date, description, sub_items, priority)
VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8)
"#,
        params![
            id,
            principal.account_id,
            principal.workspace_id,
            text,
            date,
            description,
            sub_items_json,
            priority.as_str(),
        ],
    )?;

    Ok(Todo {
        id,
        owner_id: principal.account_id.clone(),
        workspace_id: principal.workspace_id.clone(),
        text: text.to_string(),
        completed: false,
        date: date.to_string(),
        description: description.to_string(),
        sub_items: sub_items.to_vec(),
        priority,
    })
}

pub fn get_todo(conn: &Connection, principal: &Principal, id: &str) -> Result<Option<Todo>> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {TODO_COLUMNS} FROM todos \
                 WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3"
            ),
            params![id, principal.account_id, principal.workspace_id],
            read_raw,
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(Some(todo_from_raw(raw)?)),
        None => Ok(None),
    }
}

pub fn list_todos(conn: &Connection, principal: &Principal) -> Result<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TODO_COLUMNS} FROM todos \
         WHERE owner_id = ?1 AND workspace_id = ?2 ORDER BY date ASC"
    ))?;

    let mut rows = stmt.query(params![principal.account_id, principal.workspace_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(todo_from_raw(read_raw(row)?)?);
    }
    Ok(result)
}

/// Full-row update. Owner and workspace always come from the principal; a
/// client cannot move a todo across scopes through this path.
#[allow(clippy::too_many_arguments)]
pub fn update_todo(
    conn: &Connection,
    principal: &Principal,
    id: &str,
    text: &str,
    completed: bool,
    date: &str,
    description: &str,
    sub_items: &[SubItem],
    priority: Priority,
) -> Result<Todo> {
    if text.trim().is_empty() {
        return Err(Error::validation("text", "text must not be empty"));
    }
    if date.trim().is_empty() {
        return Err(Error::validation("date", "date required"));
    }

    let sub_items_json = encode_sub_items(sub_items)?;
    let changed = conn.execute(
        r#"
UPDATE todos
SET text = ?4, completed = ?5, date = ?6, description = ?7, sub_items = ?8, priority = ?9
WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3
"#,
        params![
            id,
            principal.account_id,
            principal.workspace_id,
            text,
            completed as i64,
            date,
            description,
            sub_items_json,
            priority.as_str(),
        ],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("todo"));
    }

    get_todo(conn, principal, id)?.ok_or(Error::NotFound("todo"))
}

pub fn delete_todo(conn: &Connection, principal: &Principal, id: &str) -> Result<()> {
    let changed = conn.execute(
        r#"DELETE FROM todos WHERE id = ?1 AND owner_id = ?2 AND workspace_id = ?3"#,
        params![id, principal.account_id, principal.workspace_id],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("todo"));
    }
    Ok(())
}
