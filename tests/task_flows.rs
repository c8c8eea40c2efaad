//! Task store flows over both operating modes' isolation strategies.

mod support;

use mockable::DefaultClock;
use pgnest::config::TestEndpoints;
use pgnest::provisioner::{AdminSession, Provisioner};
use pgnest::tasks::{NewTask, PostgresTaskStore, TaskStore};
use rstest::rstest;
use std::sync::Arc;
use support::{shipped_migrations, start_instance, test_runtime};
use url::Url;

#[rstest]
fn normal_mode_end_to_end() {
    let db = start_instance();
    shipped_migrations()
        .upgrade(&db.connection_url())
        .expect("apply migrations");

    let store = PostgresTaskStore::connect(&db.connection_url(), 1).expect("build store");
    let rt = test_runtime();
    rt.block_on(async {
        store
            .insert(NewTask::new("hello").expect("valid description"))
            .await
            .expect("insert task");

        let tasks = store.list().await.expect("list tasks");
        assert_eq!(tasks.len(), 1);
        let task = tasks.first().expect("one task");
        assert_eq!(task.description(), "hello");
        assert!(!task.completed());

        store.complete(task.id()).await.expect("complete task");

        let completed = store.list().await.expect("list tasks");
        assert_eq!(completed.len(), 1);
        let done = completed.first().expect("one task");
        assert_eq!(done.description(), "hello");
        assert!(done.completed());
    });
}

#[rstest]
fn insertions_stay_incomplete_until_completed() {
    let db = start_instance();
    shipped_migrations()
        .upgrade(&db.connection_url())
        .expect("apply migrations");

    let store = PostgresTaskStore::connect(&db.connection_url(), 1).expect("build store");
    let rt = test_runtime();
    rt.block_on(async {
        for index in 0..4 {
            store
                .insert(NewTask::new(format!("task {index}")).expect("valid description"))
                .await
                .expect("insert task");
        }

        let tasks = store.list().await.expect("list tasks");
        assert_eq!(tasks.len(), 4);
        assert!(tasks.iter().all(|task| !task.completed()));
    });
}

#[rstest]
fn completion_is_idempotent_and_unknown_ids_are_no_ops() {
    let db = start_instance();
    shipped_migrations()
        .upgrade(&db.connection_url())
        .expect("apply migrations");

    let store = PostgresTaskStore::connect(&db.connection_url(), 1).expect("build store");
    let rt = test_runtime();
    rt.block_on(async {
        store
            .insert(NewTask::new("hello").expect("valid description"))
            .await
            .expect("insert task");
        let tasks = store.list().await.expect("list tasks");
        let id = tasks.first().expect("one task").id();

        store.complete(id).await.expect("first completion");
        store.complete(id).await.expect("second completion");

        // An id that matches nothing silently affects zero rows.
        store
            .complete(pgnest::tasks::TaskId::from_raw(id.into_inner() + 1000))
            .await
            .expect("no-op completion");

        let after = store.list().await.expect("list tasks");
        assert_eq!(after.len(), 1);
        assert!(after.first().expect("one task").completed());
    });
}

#[rstest]
fn single_mode_flow_uses_a_fresh_connection_per_step() {
    let db = start_instance();

    // Single-mode setups hand tests the server URL without a database name;
    // model that with explicit endpoint configuration.
    let endpoints = TestEndpoints::new()
        .with_single(Url::parse(&db.admin_url()).expect("valid admin url"));
    let single_url = endpoints.single().expect("single endpoint").as_str();

    let admin = AdminSession::new(single_url);
    let service =
        Provisioner::new(admin, "single", Arc::new(DefaultClock)).expect("valid prefix");
    let mut lease = service.provision().expect("provision database");
    shipped_migrations()
        .upgrade(lease.url())
        .expect("apply migrations");
    lease.mark_migrated().expect("created to migrated");
    lease.mark_in_use().expect("migrated to in_use");

    let rt = test_runtime();
    let task_id = rt.block_on(async {
        {
            let store = PostgresTaskStore::connect(lease.url(), 1).expect("build store");
            store
                .insert(NewTask::new("hello").expect("valid description"))
                .await
                .expect("insert task");
        }

        let id = {
            let store = PostgresTaskStore::connect(lease.url(), 1).expect("build store");
            let tasks = store.list().await.expect("list tasks");
            assert_eq!(tasks.len(), 1);
            let task = tasks.first().expect("one task");
            assert_eq!(task.description(), "hello");
            assert!(!task.completed());
            task.id()
        };

        {
            let store = PostgresTaskStore::connect(lease.url(), 1).expect("build store");
            store.complete(id).await.expect("complete task");
        }

        {
            let store = PostgresTaskStore::connect(lease.url(), 1).expect("build store");
            let tasks = store.list().await.expect("list tasks");
            assert_eq!(tasks.len(), 1);
            let task = tasks.first().expect("one task");
            assert_eq!(task.description(), "hello");
            assert!(task.completed());
        }
        id
    });
    assert!(task_id.into_inner() >= 1);

    lease.release().expect("drop database");
}
