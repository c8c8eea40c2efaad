//! Single-mode provisioning tests: leases, uniqueness, idempotent teardown,
//! and templates.

mod support;

use diesel::prelude::*;
use mockable::DefaultClock;
use pgnest::provisioner::{
    AdminSession, DatabaseLifecycle, DatabaseName, Provisioner, ProvisionerError,
};
use rstest::rstest;
use std::collections::HashSet;
use std::sync::Arc;
use support::{establish, shipped_migrations, start_instance};

fn provisioner(admin: AdminSession) -> Provisioner<DefaultClock> {
    Provisioner::new(admin, "test", Arc::new(DefaultClock)).expect("valid prefix")
}

#[rstest]
fn lease_walks_created_migrated_in_use_dropped() {
    let db = start_instance();
    let admin = AdminSession::new(db.admin_url());
    let service = provisioner(admin.clone());

    let mut lease = service.provision().expect("provision database");
    assert_eq!(lease.stage(), DatabaseLifecycle::Created);
    assert!(admin.database_exists(lease.name()).expect("existence query"));

    shipped_migrations()
        .upgrade(lease.url())
        .expect("apply migrations");
    lease.mark_migrated().expect("created to migrated");
    lease.mark_in_use().expect("migrated to in_use");

    let name = lease.name().clone();
    lease.release().expect("drop database");
    assert!(!admin.database_exists(&name).expect("existence query"));
}

#[rstest]
fn leases_tear_down_on_scope_exit() {
    let db = start_instance();
    let admin = AdminSession::new(db.admin_url());
    let service = provisioner(admin.clone());

    let name = {
        let lease = service.provision().expect("provision database");
        lease.name().clone()
    };
    assert!(!admin.database_exists(&name).expect("existence query"));
}

#[rstest]
fn releasing_an_externally_dropped_database_is_not_fatal() {
    let db = start_instance();
    let admin = AdminSession::new(db.admin_url());
    let service = provisioner(admin.clone());

    let lease = service.provision().expect("provision database");
    admin.drop_database(lease.name()).expect("external drop");
    lease.release().expect("idempotent release");
}

#[rstest]
fn dropping_twice_is_idempotent() {
    let db = start_instance();
    let admin = AdminSession::new(db.admin_url());
    let name = DatabaseName::new("drop_me_twice").expect("valid name");

    admin.create_database(&name).expect("create database");
    admin.drop_database(&name).expect("first drop");
    admin.drop_database(&name).expect("second drop");
}

#[rstest]
fn creating_a_taken_name_is_a_conflict() {
    let db = start_instance();
    let admin = AdminSession::new(db.admin_url());
    let name = DatabaseName::new("taken").expect("valid name");

    admin.create_database(&name).expect("create database");
    let result = admin.create_database(&name);
    assert!(matches!(result, Err(ProvisionerError::AlreadyExists(found)) if found == name));

    admin.drop_database(&name).expect("cleanup");
}

#[rstest]
fn concurrent_workers_get_distinct_databases() {
    let db = start_instance();
    let admin = AdminSession::new(db.admin_url());
    let service = Arc::new(provisioner(admin.clone()));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let shared = Arc::clone(&service);
        handles.push(std::thread::spawn(move || {
            (0..3)
                .map(|_| shared.provision().expect("provision database"))
                .collect::<Vec<_>>()
        }));
    }

    let mut names = HashSet::new();
    let mut leases = Vec::new();
    for handle in handles {
        for lease in handle.join().expect("worker thread") {
            assert!(
                names.insert(lease.name().clone()),
                "two workers received the same database"
            );
            assert!(admin.database_exists(lease.name()).expect("existence query"));
            leases.push(lease);
        }
    }
    assert_eq!(names.len(), 12);

    for lease in leases {
        lease.release().expect("drop database");
    }
}

#[rstest]
fn template_clones_skip_per_test_migration() {
    let db = start_instance();
    let admin = AdminSession::new(db.admin_url());
    let service = provisioner(admin.clone());
    let template = DatabaseName::new("pgnest_template").expect("valid name");

    service
        .ensure_template(&template, |name| {
            let template_name = DatabaseName::new(name)?;
            let url = admin.database_url(&template_name)?;
            shipped_migrations().upgrade(&url)?;
            Ok(())
        })
        .expect("template setup");
    // A second call finds the template and does nothing.
    service
        .ensure_template(&template, |_| {
            panic!("template migration ran twice");
        })
        .expect("template reuse");

    let lease = service
        .provision_from_template(&template)
        .expect("clone template");
    assert_eq!(lease.stage(), DatabaseLifecycle::Migrated);

    // The clone carries the migrated schema.
    let mut conn = establish(lease.url());
    diesel::sql_query("INSERT INTO tasks (task) VALUES ('from template')")
        .execute(&mut conn)
        .expect("insert into cloned schema");

    drop(conn);
    lease.release().expect("drop database");
    admin.drop_database(&template).expect("drop template");
}
