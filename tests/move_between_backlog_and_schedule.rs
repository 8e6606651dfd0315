use dayboard::auth::{self, AuthConfig};
use dayboard::db::{self, backlog, cascade, categories, todos};
use dayboard::db::{Principal, Priority, SubItem};
use dayboard::Error;

fn principal_of(account: &dayboard::db::Account) -> Principal {
    Principal {
        account_id: account.id.clone(),
        workspace_id: account
            .current_workspace_id
            .clone()
            .expect("current workspace"),
    }
}

fn sub_items() -> Vec<SubItem> {
    vec![
        SubItem {
            id: "s1".into(),
            text: "outline".into(),
            completed: true,
        },
        SubItem {
            id: "s2".into(),
            text: "draft".into(),
            completed: false,
        },
    ]
}

#[test]
fn todo_to_backlog_copies_fields_and_drops_the_date() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let principal = principal_of(&account);

    let todo = todos::create_todo(
        &conn,
        &principal,
        "write report",
        "2026-09-15",
        "quarterly numbers",
        &sub_items(),
        Priority::High,
    )
    .expect("todo");

    let item = cascade::move_todo_to_backlog(&conn, &principal, &todo.id).expect("move");

    assert_eq!(item.text, "write report");
    assert_eq!(item.description, "quarterly numbers");
    assert_eq!(item.sub_items, sub_items());
    assert_eq!(item.priority, Priority::High);
    assert_eq!(item.category_id, None);
    assert!(!item.completed);

    // Both-or-neither: the todo is gone, the backlog row exists.
    assert!(todos::get_todo(&conn, &principal, &todo.id)
        .expect("lookup")
        .is_none());
    assert!(backlog::get_backlog_item(&conn, &principal, &item.id)
        .expect("lookup")
        .is_some());
}

#[test]
fn roundtrip_preserves_fields_and_reattaches_the_date() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let principal = principal_of(&account);

    let todo = todos::create_todo(
        &conn,
        &principal,
        "write report",
        "2026-09-15",
        "quarterly numbers",
        &sub_items(),
        Priority::Low,
    )
    .expect("todo");
    todos::update_todo(
        &conn,
        &principal,
        &todo.id,
        "write report",
        true,
        "2026-09-15",
        "quarterly numbers",
        &sub_items(),
        Priority::Low,
    )
    .expect("mark completed");

    let item = cascade::move_todo_to_backlog(&conn, &principal, &todo.id).expect("to backlog");
    assert!(item.completed, "completion state survives the move");

    let back = cascade::move_backlog_to_todo(&conn, &principal, &item.id, "2026-09-15")
        .expect("back to schedule");

    assert_eq!(back.text, "write report");
    assert_eq!(back.description, "quarterly numbers");
    assert_eq!(back.sub_items, sub_items());
    assert_eq!(back.priority, Priority::Low);
    assert_eq!(back.date, "2026-09-15");
    assert!(back.completed);

    assert!(backlog::get_backlog_item(&conn, &principal, &item.id)
        .expect("lookup")
        .is_none());
}

#[test]
fn backlog_to_todo_requires_a_date() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let principal = principal_of(&account);

    let item = backlog::create_backlog_item(
        &conn,
        &principal,
        "read paper",
        "",
        &[],
        Priority::Medium,
        None,
    )
    .expect("backlog item");

    let err = cascade::move_backlog_to_todo(&conn, &principal, &item.id, "  ")
        .expect_err("blank date rejected");
    assert!(matches!(err, Error::Validation { field: "date", .. }));
    assert_eq!(err.status_code(), 400);

    // The item did not move.
    assert!(backlog::get_backlog_item(&conn, &principal, &item.id)
        .expect("lookup")
        .is_some());
}

#[test]
fn category_link_does_not_survive_scheduling() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let principal = principal_of(&account);

    let category =
        categories::create_category(&conn, &principal, "Reading", "#0f0").expect("category");
    let item = backlog::create_backlog_item(
        &conn,
        &principal,
        "read paper",
        "",
        &[],
        Priority::Medium,
        Some(&category.id),
    )
    .expect("backlog item");

    let todo = cascade::move_backlog_to_todo(&conn, &principal, &item.id, "2026-10-01")
        .expect("schedule");
    let again = cascade::move_todo_to_backlog(&conn, &principal, &todo.id).expect("park again");

    // Todos carry no category, so the link is gone after a lap.
    assert_eq!(again.category_id, None);
}

#[test]
fn moving_unknown_items_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let app_dir = temp.path().join("dayboard");
    let conn = db::open(&app_dir).expect("open db");
    let config = AuthConfig::for_test();

    let account =
        auth::signup(&conn, &config, "Ada", "ada@example.com", "pw123456").expect("signup");
    let principal = principal_of(&account);

    let err = cascade::move_todo_to_backlog(&conn, &principal, "no-such-todo")
        .expect_err("unknown todo");
    assert!(matches!(err, Error::NotFound("todo")));

    let err = cascade::move_backlog_to_todo(&conn, &principal, "no-such-item", "2026-10-01")
        .expect_err("unknown backlog item");
    assert!(matches!(err, Error::NotFound("backlog item")));
}
