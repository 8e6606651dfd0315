use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod accounts;
pub mod backlog;
pub mod cascade;
pub mod categories;
pub mod memos;
pub mod todos;
pub mod workspaces;

/// Authenticated request context. Produced once per request by the auth
/// layer and passed explicitly to every scoped read/write; nothing in the
/// db layer trusts client-supplied owner or workspace ids.
#[derive(Clone, Debug)]
pub struct Principal {
    pub account_id: String,
    pub workspace_id: String,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub current_workspace_id: Option<String>,
    pub password_changed_at_ms: Option<i64>,
    pub last_active_at_ms: Option<i64>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct Category {
    pub id: String,
    pub owner_id: String,
    pub workspace_id: String,
    pub name: String,
    pub color: String,
}

/// Ordered checklist entry inside a todo or backlog item. Stored as one JSON
/// text column; order in the list is the display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(Error::validation(
                "priority",
                format!("unknown priority '{other}'"),
            )),
        }
    }
}

/// A to-do item bound to a calendar date.
#[derive(Clone, Debug)]
pub struct Todo {
    pub id: String,
    pub owner_id: String,
    pub workspace_id: String,
    pub text: String,
    pub completed: bool,
    pub date: String,
    pub description: String,
    pub sub_items: Vec<SubItem>,
    pub priority: Priority,
}

/// A to-do item not yet bound to a date. `category_id` is a weak reference:
/// the category may be deleted out from under it, at which point it goes null.
#[derive(Clone, Debug)]
pub struct BacklogItem {
    pub id: String,
    pub owner_id: String,
    pub workspace_id: String,
    pub text: String,
    pub completed: bool,
    pub description: String,
    pub sub_items: Vec<SubItem>,
    pub priority: Priority,
    pub category_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Memo {
    pub id: String,
    pub owner_id: String,
    pub workspace_id: String,
    pub title: String,
    pub content: String,
    pub last_edited_ms: i64,
    pub category_id: Option<String>,
}

fn db_path(app_dir: &Path) -> PathBuf {
    app_dir.join("dayboard.sqlite3")
}

pub(crate) fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(i64::MAX)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn encode_sub_items(sub_items: &[SubItem]) -> Result<String> {
    Ok(serde_json::to_string(sub_items)?)
}

pub(crate) fn decode_sub_items(raw: &str) -> Result<Vec<SubItem>> {
    Ok(serde_json::from_str(raw)?)
}

/// Run `f` inside a single `BEGIN IMMEDIATE` transaction. All writes land on
/// commit or none do; any error rolls back before propagating.
pub(crate) fn immediate_tx<T>(conn: &Connection, f: impl FnOnce() -> Result<T>) -> Result<T> {
    conn.execute_batch("BEGIN IMMEDIATE;").map_err(Error::from)?;

    match f() {
        Ok(value) => {
            conn.execute_batch("COMMIT;").map_err(Error::from)?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK;");
            Err(e)
        }
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let user_version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if user_version < 1 {
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS accounts (
  id TEXT PRIMARY KEY,
  display_name TEXT NOT NULL,
  email TEXT NOT NULL UNIQUE,
  password_hash TEXT NOT NULL,
  password_salt TEXT NOT NULL,
  current_workspace_id TEXT,
  password_changed_at_ms INTEGER,
  last_active_at_ms INTEGER,
  created_at_ms INTEGER NOT NULL,
  updated_at_ms INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS workspaces (
  id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  description TEXT NOT NULL DEFAULT '',
  owner_id TEXT NOT NULL REFERENCES accounts(id),
  created_at_ms INTEGER NOT NULL,
  updated_at_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workspaces_owner
  ON workspaces(owner_id, updated_at_ms);

CREATE TABLE IF NOT EXISTS categories (
  id TEXT PRIMARY KEY,
  owner_id TEXT NOT NULL,
  workspace_id TEXT NOT NULL,
  name TEXT NOT NULL,
  color TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_categories_scope
  ON categories(owner_id, workspace_id);

CREATE TABLE IF NOT EXISTS todos (
  id TEXT PRIMARY KEY,
  owner_id TEXT NOT NULL,
  workspace_id TEXT NOT NULL,
  text TEXT NOT NULL,
  completed INTEGER NOT NULL DEFAULT 0,
  date TEXT NOT NULL,
  description TEXT NOT NULL DEFAULT '',
  sub_items TEXT NOT NULL DEFAULT '[]',
  priority TEXT NOT NULL DEFAULT 'medium'
);

CREATE INDEX IF NOT EXISTS idx_todos_scope
  ON todos(owner_id, workspace_id, date);

CREATE TABLE IF NOT EXISTS backlog_items (
  id TEXT PRIMARY KEY,
  owner_id TEXT NOT NULL,
  workspace_id TEXT NOT NULL,
  text TEXT NOT NULL,
  completed INTEGER NOT NULL DEFAULT 0,
  description TEXT NOT NULL DEFAULT '',
  sub_items TEXT NOT NULL DEFAULT '[]',
  priority TEXT NOT NULL DEFAULT 'medium',
  category_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_backlog_scope
  ON backlog_items(owner_id, workspace_id);

CREATE TABLE IF NOT EXISTS memos (
  id TEXT PRIMARY KEY,
  owner_id TEXT NOT NULL,
  workspace_id TEXT NOT NULL,
  title TEXT NOT NULL,
  content TEXT NOT NULL DEFAULT '',
  last_edited_ms INTEGER NOT NULL,
  category_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_memos_scope
  ON memos(owner_id, workspace_id);

PRAGMA user_version = 1;
"#,
        )?;
    }

    Ok(())
}

pub fn open(app_dir: &Path) -> Result<Connection> {
    fs::create_dir_all(app_dir)
        .map_err(|e| Error::OperationFailed(format!("create app dir failed: {e}")))?;
    let conn = Connection::open(db_path(app_dir))?;
    conn.query_row("PRAGMA journal_mode = WAL;", [], |_row| Ok(()))?;
    conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
    migrate(&conn)?;
    Ok(conn)
}
