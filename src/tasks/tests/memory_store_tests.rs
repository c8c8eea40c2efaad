//! Behavioural tests for the in-memory store, pinning the port contract.

use crate::tasks::adapters::memory::InMemoryTaskStore;
use crate::tasks::domain::{NewTask, TaskId};
use crate::tasks::ports::TaskStore;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[fixture]
fn rt() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

#[rstest]
fn inserted_tasks_start_incomplete(rt: Runtime) {
    let store = InMemoryTaskStore::new();
    rt.block_on(async {
        store
            .insert(NewTask::new("hello").expect("valid description"))
            .await
            .expect("insert");

        let tasks = store.list().await.expect("list");
        assert_eq!(tasks.len(), 1);
        let task = tasks.first().expect("one task");
        assert_eq!(task.description(), "hello");
        assert!(!task.completed());
    });
}

#[rstest]
fn listing_returns_every_insertion(rt: Runtime) {
    let store = InMemoryTaskStore::new();
    rt.block_on(async {
        for index in 0..5 {
            store
                .insert(NewTask::new(format!("task {index}")).expect("valid description"))
                .await
                .expect("insert");
        }

        let tasks = store.list().await.expect("list");
        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|task| !task.completed()));
    });
}

#[rstest]
fn completion_transitions_and_stays_idempotent(rt: Runtime) {
    let store = InMemoryTaskStore::new();
    rt.block_on(async {
        store
            .insert(NewTask::new("hello").expect("valid description"))
            .await
            .expect("insert");

        let inserted = store.list().await.expect("list");
        let id = inserted.first().expect("one task").id();

        store.complete(id).await.expect("first completion");
        store.complete(id).await.expect("second completion");

        let tasks = store.list().await.expect("list");
        let task = tasks.first().expect("one task");
        assert!(task.completed());
        assert_eq!(tasks.len(), 1);
    });
}

#[rstest]
fn completing_an_unknown_id_is_a_silent_no_op(rt: Runtime) {
    let store = InMemoryTaskStore::new();
    rt.block_on(async {
        store
            .insert(NewTask::new("hello").expect("valid description"))
            .await
            .expect("insert");

        store
            .complete(TaskId::from_raw(999))
            .await
            .expect("no-op completion");

        let tasks = store.list().await.expect("list");
        assert!(tasks.iter().all(|task| !task.completed()));
    });
}
