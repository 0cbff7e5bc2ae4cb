//! Action Flow Tests
//!
//! The action wrapper against an in-process remote store:
//! - local merge happens before the flush
//! - batches reach the remote in submission order
//! - each batch yields Begin then End or Fail
//! - remote failures never roll back local state

use crate::common::*;
use restore::{
    load_data, with_session, ActionWrapper, Collection, Error, MemoryRemote, OpKind, RemoteError,
    RemoteSignal, RowId, Session,
};
use std::sync::Arc;

fn toggle(session: &Session, id: i64) -> Result<(), Error> {
    let todos = session.table("todo")?;
    if let Some(todo) = todos.by_id(&RowId::from(id))? {
        let done = todo.get("completed").and_then(|v| v.as_bool()).unwrap_or(false);
        todo.set("completed", !done);
    }
    Ok(())
}

fn add(session: &Session, (id, text): (i64, &str)) -> Result<(), Error> {
    session.table("todo")?.create(todo(id, text, false))?;
    Ok(())
}

// ============================================================================
// Initial Load
// ============================================================================

#[test]
fn initial_load_then_action() {
    let remote = Arc::new(MemoryRemote::new(todo_dataset()));
    let mut model = Model::new(Default::default());

    load_data(remote.as_ref(), &mut model).unwrap();
    assert_eq!(model.data, remote.data());

    let (sink, signals) = recorder();
    let wrapper = ActionWrapper::with_store(remote.clone(), sink, 16).unwrap();
    wrapper.run(&mut model, |s| toggle(s, 0)).unwrap();
    wrapper.flush_queue().unwrap().drain();

    assert_eq!(*signals.lock(), vec![RemoteSignal::Begin, RemoteSignal::End]);
    assert_eq!(remote.data(), model.data);
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn batches_apply_in_submission_order() {
    let remote = Arc::new(MemoryRemote::new(todo_dataset()));
    let (sink, signals) = recorder();
    let wrapper = ActionWrapper::with_store(remote.clone(), sink, 16).unwrap();
    let add_todo = with_session::<Model, _, _, _, _>(&wrapper, add);

    let mut model = Model::new(todo_dataset());
    add_todo(&mut model, (1, "one")).unwrap();
    add_todo(&mut model, (2, "two")).unwrap();
    wrapper.run(&mut model, |s| toggle(s, 1)).unwrap();
    wrapper.flush_queue().unwrap().drain();

    let applied = remote.applied();
    let kinds: Vec<OpKind> = applied.iter().map(|batch| batch[0].kind).collect();
    assert_eq!(kinds, vec![OpKind::Create, OpKind::Create, OpKind::Update]);

    // Create of 2 before update of 1 would still succeed, so also check ids
    let ids: Vec<Option<RowId>> = applied.iter().map(|batch| batch[0].row_id()).collect();
    assert_eq!(
        ids,
        vec![
            Some(RowId::from(1)),
            Some(RowId::from(2)),
            Some(RowId::from(1))
        ]
    );

    assert_eq!(signals.lock().len(), 6);
    assert_eq!(remote.data(), model.data);
    assert_eq!(model.renders, 3);
}

#[test]
fn no_change_means_no_flush() {
    let remote = Arc::new(MemoryRemote::new(todo_dataset()));
    let (sink, signals) = recorder();
    let wrapper = ActionWrapper::with_store(remote.clone(), sink, 16).unwrap();

    let mut model = Model::new(todo_dataset());
    let outcome = wrapper
        .execute(&mut model, |s| {
            toggle(s, 0)?;
            toggle(s, 0)
        })
        .unwrap();
    wrapper.flush_queue().unwrap().drain();

    assert_eq!(outcome.flush, None);
    assert!(signals.lock().is_empty());
    assert!(remote.applied().is_empty());
    assert_eq!(model.renders, 0);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[test]
fn remote_failure_is_a_signal_not_an_error() {
    let remote = Arc::new(MemoryRemote::new(todo_dataset()));
    remote.fail_next(RemoteError::Status(500));
    let (sink, signals) = recorder();
    let wrapper = ActionWrapper::with_store(remote.clone(), sink, 16).unwrap();

    let mut model = Model::new(todo_dataset());
    let result = wrapper.run(&mut model, |s| add(s, (9, "kept locally")));
    assert!(result.is_ok());
    wrapper.flush_queue().unwrap().drain();

    assert_eq!(
        *signals.lock(),
        vec![
            RemoteSignal::Begin,
            RemoteSignal::Fail(RemoteError::Status(500).to_string())
        ]
    );
    assert_eq!(model.data.get("todo").unwrap().len(), 2);
    assert_eq!(remote.data().get("todo").unwrap().len(), 1);
}

#[test]
fn remote_rejection_leaves_remote_untouched() {
    // The remote already has id 1, so the batch is rejected as a whole
    let mut remote_data = todo_dataset();
    remote_data.insert(
        "todo",
        Collection::new(vec![todo(0, "Use Redux", false), todo(1, "remote", false)]),
    );
    let remote = Arc::new(MemoryRemote::new(remote_data));
    let (sink, signals) = recorder();
    let wrapper = ActionWrapper::with_store(remote.clone(), sink, 16).unwrap();

    let mut model = Model::new(todo_dataset());
    wrapper
        .run(&mut model, |s| {
            toggle(s, 0)?;
            add(s, (1, "local"))
        })
        .unwrap();
    wrapper.flush_queue().unwrap().drain();

    let signals = signals.lock();
    assert_eq!(signals.len(), 2);
    assert!(matches!(signals[1], RemoteSignal::Fail(_)));
    assert_eq!(
        text_of(&remote.data().get("todo").unwrap().rows()[1], "text").as_deref(),
        Some("remote")
    );
    assert!(remote.applied().is_empty());
}

#[test]
fn business_error_skips_merge_and_flush() {
    let remote = Arc::new(MemoryRemote::new(todo_dataset()));
    let (sink, signals) = recorder();
    let wrapper = ActionWrapper::with_store(remote.clone(), sink, 16).unwrap();

    let mut model = Model::new(todo_dataset());
    let err = wrapper
        .run(&mut model, |s| {
            toggle(s, 0)?;
            add(s, (0, "duplicate"))
        })
        .unwrap_err();
    wrapper.flush_queue().unwrap().drain();

    assert!(matches!(err, Error::Conflict { .. }));
    assert_eq!(model.renders, 0);
    assert!(signals.lock().is_empty());
}

#[test]
fn shutdown_queue_reports_failure_for_new_batches() {
    let remote = Arc::new(MemoryRemote::new(todo_dataset()));
    let (sink, signals) = recorder();
    let wrapper = ActionWrapper::with_store(remote.clone(), sink, 16).unwrap();
    wrapper.flush_queue().unwrap().shutdown();

    let mut model = Model::new(todo_dataset());
    let outcome = wrapper.execute(&mut model, |s| toggle(s, 0)).unwrap();

    assert_eq!(outcome.flush, None);
    assert_eq!(model.renders, 1);
    assert_eq!(
        *signals.lock(),
        vec![
            RemoteSignal::Begin,
            RemoteSignal::Fail(RemoteError::Shutdown.to_string())
        ]
    );
}
