use dayboard::auth::{self, AuthConfig};
use dayboard::db::{self, accounts, backlog, cascade, categories, memos, todos, workspaces};
use dayboard::db::{Principal, Priority};
use dayboard::Error;
use rusqlite::params;

fn scoped_row_count(conn: &rusqlite::Connection, workspace_id: &str) -> i64 {
    conn.query_row(
        "SELECT (SELECT COUNT(*) FROM categories WHERE workspace_id = ?1)
              + (SELECT COUNT(*) FROM todos WHERE workspace_id = ?1)
              + (SELECT COUNT(*) FROM backlog_items WHERE workspace_id = ?1)
              + (SELECT COUNT(*) FROM memos WHERE workspace_id = ?1)",
        params![workspace_id],
        |row| row.get(0),
    )
    .expect("count scoped rows")
}

fn populate(conn: &rusqlite::Connection, principal: &Principal) {
    let category =
        categories::create_category(conn, principal, "Errands", "#ff0000").expect("category");
    todos::create_todo(conn, principal, "buy milk", "2026-09-01", "", &[], Priority::Medium)
        .expect("todo");
    backlog::create_backlog_item(
        conn,
        principal,
        "read paper",
        "",
        &[],
        Priority::Low,
        Some(&category.id),
    )
    .expect("backlog item");
    memos::create_memo(conn, principal, "Notes", "remember", Some(&category.id)).expect("memo");
}

#[test]
fn last_workspace_cannot_be_deleted() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let only = account.current_workspace_id.clone().expect("current");
    let principal = Principal {
        account_id: account.id.clone(),
        workspace_id: only.clone(),
    };
    populate(&conn, &principal);

    let err = cascade::delete_workspace(&conn, &account.id, &only)
        .expect_err("last workspace must survive");
    assert!(matches!(err, Error::InvalidOperation(_)));
    assert_eq!(err.status_code(), 400);

    // Nothing was removed.
    assert!(workspaces::get_owned(&conn, &only, &account.id)
        .expect("lookup")
        .is_some());
    assert_eq!(scoped_row_count(&conn, &only), 4);
}

#[test]
fn deleting_current_workspace_cascades_and_reassigns() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let w1 = account.current_workspace_id.clone().expect("current");
    let w2 = workspaces::create_workspace(&conn, &account.id, "Archive", "old stuff")
        .expect("second workspace")
        .id;

    let p1 = Principal {
        account_id: account.id.clone(),
        workspace_id: w1.clone(),
    };
    let p2 = Principal {
        account_id: account.id.clone(),
        workspace_id: w2.clone(),
    };
    populate(&conn, &p1);
    populate(&conn, &p2);

    cascade::delete_workspace(&conn, &account.id, &w1).expect("delete current workspace");

    assert!(workspaces::get_owned(&conn, &w1, &account.id)
        .expect("lookup")
        .is_none());
    assert_eq!(scoped_row_count(&conn, &w1), 0);
    // The other workspace is untouched.
    assert_eq!(scoped_row_count(&conn, &w2), 4);

    let healed = accounts::get_account(&conn, &account.id)
        .expect("reload")
        .expect("account exists");
    assert_eq!(healed.current_workspace_id.as_deref(), Some(w2.as_str()));
}

#[test]
fn deleting_a_non_current_workspace_keeps_current() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let w1 = account.current_workspace_id.clone().expect("current");
    let w2 = workspaces::create_workspace(&conn, &account.id, "Archive", "")
        .expect("second workspace")
        .id;

    cascade::delete_workspace(&conn, &account.id, &w2).expect("delete side workspace");

    let reloaded = accounts::get_account(&conn, &account.id)
        .expect("reload")
        .expect("account exists");
    assert_eq!(reloaded.current_workspace_id.as_deref(), Some(w1.as_str()));
}

#[test]
fn foreign_workspace_delete_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let ada = auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let bob = auth::signup(&conn, &config, "Bob", "bob@example.com", "pw123456").expect("signup");
    let bobs = bob.current_workspace_id.clone().expect("bob current");
    workspaces::create_workspace(&conn, &bob.id, "Spare", "").expect("bob second");

    // Bob owns two workspaces, but ada is asking.
    let err =
        cascade::delete_workspace(&conn, &ada.id, &bobs).expect_err("not ada's workspace");
    assert!(matches!(err, Error::NotFound("workspace")));
    assert!(workspaces::get_owned(&conn, &bobs, &bob.id)
        .expect("lookup")
        .is_some());
}
