//! Session Scenarios
//!
//! Full session workflows over small datasets:
//! - Update, create and delete detection
//! - Identity of unchanged collections
//! - Row-level errors leave the session usable

use crate::common::*;
use restore::{Error, Filter, OpKind, OperationRecord, Row, RowId, Session};

// ============================================================================
// Example Workflows
// ============================================================================

#[test]
fn rename_user_updates_in_place() {
    let data = users_dataset();
    let session = Session::new(&data);

    let users = session.table("users").unwrap();
    users.by_id(&RowId::from(1)).unwrap().unwrap().set("name", "a1");

    let commit = session.finalize();
    assert_eq!(
        commit.updates.get("users").unwrap().rows(),
        &[user(1, "a1"), user(2, "b")]
    );
    assert_eq!(commit.ops, vec![OperationRecord::update("users", user(1, "a1"))]);

    // Input is untouched
    assert_eq!(data.get("users").unwrap().rows(), &[user(1, "a"), user(2, "b")]);
}

#[test]
fn create_user_appends() {
    let data = users_dataset();
    let session = Session::new(&data);

    session.table("users").unwrap().create(user(3, "c")).unwrap();

    let commit = session.finalize();
    let users = commit.updates.get("users").unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users.rows()[2], user(3, "c"));
    assert_eq!(commit.ops.len(), 1);
    assert_eq!(commit.ops[0].kind, OpKind::Create);
}

#[test]
fn delete_carries_original_fields() {
    let data = users_dataset();
    let session = Session::new(&data);
    let users = session.table("users").unwrap();

    let first = users.by_id(&RowId::from(1)).unwrap().unwrap();
    first.set("name", "edited before delete");
    users.remove(&first).unwrap();
    assert!(users.by_id(&RowId::from(1)).unwrap().is_none());

    let commit = session.finalize();
    assert_eq!(commit.updates.get("users").unwrap().rows(), &[user(2, "b")]);
    assert_eq!(commit.ops, vec![OperationRecord::delete("users", user(1, "a"))]);
}

#[test]
fn mixed_changes_follow_first_touch_order() {
    let data = users_dataset();
    let session = Session::new(&data);
    let users = session.table("users").unwrap();

    users.create(user(3, "c")).unwrap();
    users.by_id(&RowId::from(2)).unwrap().unwrap().set("name", "b2");
    users.remove_id(RowId::from(1));

    let commit = session.finalize();
    let kinds: Vec<OpKind> = commit.ops.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![OpKind::Create, OpKind::Update, OpKind::Delete]);
    assert_eq!(
        commit.updates.get("users").unwrap().rows(),
        &[user(2, "b2"), user(3, "c")]
    );
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn read_only_session_keeps_every_collection() {
    let data = todo_dataset();
    let session = Session::new(&data);

    let todo = session.table("todo").unwrap();
    let row = todo.by_id(&RowId::from(0)).unwrap().unwrap();
    row.set("text", "Use Redux");
    session
        .table("users")
        .unwrap()
        .filter(&Filter::all())
        .unwrap();

    let commit = session.finalize();
    assert!(commit.is_empty());
    assert!(commit.ops.is_empty());
}

#[test]
fn unchanged_table_is_left_out_of_updates() {
    let data = todo_dataset();
    let session = Session::new(&data);

    session
        .table("todo")
        .unwrap()
        .create(todo(1, "second", false))
        .unwrap();

    let commit = session.finalize();
    assert!(commit.updates.contains("todo"));
    assert!(!commit.updates.contains("users"));

    let merged = data.merge(&commit.updates);
    assert!(merged
        .get("users")
        .unwrap()
        .ptr_eq(data.get("users").unwrap()));
}

#[test]
fn repeated_lookups_share_one_handle() {
    let data = users_dataset();
    let session = Session::new(&data);
    let users = session.table("users").unwrap();

    let by_id = users.by_id(&RowId::from(2)).unwrap().unwrap();
    let filtered = users.filter(&Filter::all().eq("name", "b")).unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(by_id.ptr_eq(&filtered[0]));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn row_errors_do_not_poison_session() {
    let data = users_dataset();
    let session = Session::new(&data);
    let users = session.table("users").unwrap();

    assert!(matches!(
        users.create(Row::new().with("name", "x")),
        Err(Error::Validation { .. })
    ));
    assert!(matches!(
        users.create(user(1, "dup")),
        Err(Error::Conflict { .. })
    ));

    users.create(user(4, "d")).unwrap();
    let commit = session.finalize();
    assert_eq!(commit.ops.len(), 1);
    assert_eq!(commit.updates.get("users").unwrap().len(), 3);
}

#[test]
fn string_and_int_ids_are_distinct() {
    let data = users_dataset();
    let session = Session::new(&data);
    let users = session.table("users").unwrap();

    assert!(users.by_id(&RowId::from("1")).unwrap().is_none());
    users
        .create(Row::new().with("id", "1").with("name", "text id"))
        .unwrap();
    assert_eq!(session.finalize().updates.get("users").unwrap().len(), 3);
}

#[test]
fn unknown_collection_is_an_error() {
    let session = Session::new(&users_dataset());
    assert!(matches!(
        session.table("missing"),
        Err(Error::UnknownTable(_))
    ));
}
