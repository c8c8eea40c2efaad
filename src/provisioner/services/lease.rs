//! Logical database leases and the provisioning service issuing them.

use crate::provisioner::adapters::postgres::AdminSession;
use crate::provisioner::domain::{
    DatabaseLifecycle, DatabaseName, NameAllocator, ProvisionerError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, OnceLock};

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Error type accepted from template setup closures.
pub type TemplateSetupError = Box<dyn std::error::Error + Send + Sync>;

/// Issues per-test logical databases on a running instance.
///
/// The only shared mutable resource between concurrent workers is the name
/// namespace, covered by the allocator's atomic counter; everything else is
/// per-lease.
pub struct Provisioner<C>
where
    C: Clock,
{
    admin: AdminSession,
    allocator: NameAllocator,
    clock: Arc<C>,
}

impl<C> Provisioner<C>
where
    C: Clock,
{
    /// Creates a provisioner issuing databases named under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::InvalidPrefix`] when the prefix violates
    /// identifier rules.
    pub fn new(admin: AdminSession, prefix: &str, clock: Arc<C>) -> Result<Self, ProvisionerError> {
        Ok(Self {
            admin,
            allocator: NameAllocator::new(prefix)?,
            clock,
        })
    }

    /// Creates a fresh logical database and returns its lease.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::AlreadyExists`] on a name conflict and
    /// [`ProvisionerError::Admin`] on connection or statement failure.
    pub fn provision(&self) -> Result<DatabaseLease, ProvisionerError> {
        let name = self.allocator.allocate();
        let database_url = self.admin.database_url(&name)?;
        self.admin.create_database(&name)?;
        Ok(DatabaseLease::created(
            self.admin.clone(),
            name,
            database_url,
            self.clock.utc(),
        ))
    }

    /// Creates a logical database cloned from a pre-migrated template; the
    /// lease starts in the migrated stage.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::AlreadyExists`] on a name conflict and
    /// [`ProvisionerError::Admin`] on connection or statement failure.
    pub fn provision_from_template(
        &self,
        template: &DatabaseName,
    ) -> Result<DatabaseLease, ProvisionerError> {
        let name = self.allocator.allocate();
        let database_url = self.admin.database_url(&name)?;
        self.admin.create_database_from_template(&name, template)?;
        let mut lease = DatabaseLease::created(
            self.admin.clone(),
            name,
            database_url,
            self.clock.utc(),
        );
        lease.mark_migrated()?;
        Ok(lease)
    }

    /// Creates the template database once, running `migrate` against its
    /// name. Template creation is serialised process-wide; a failed setup
    /// drops the partial template before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::TemplateSetup`] when the migration closure
    /// fails and [`ProvisionerError::Admin`] on connection or statement
    /// failure.
    pub fn ensure_template<F>(
        &self,
        template: &DatabaseName,
        migrate: F,
    ) -> Result<(), ProvisionerError>
    where
        F: FnOnce(&str) -> Result<(), TemplateSetupError>,
    {
        let lock = TEMPLATE_LOCK.get_or_init(|| Mutex::new(()));
        let _guard = lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if self.admin.database_exists(template)? {
            return Ok(());
        }

        self.admin.create_database(template)?;
        if let Err(err) = migrate(template.as_str()) {
            self.admin.drop_database(template)?;
            return Err(ProvisionerError::TemplateSetup(Arc::from(err)));
        }
        Ok(())
    }

    /// Returns the admin session this provisioner uses.
    #[must_use]
    pub const fn admin(&self) -> &AdminSession {
        &self.admin
    }
}

/// Handle to one provisioned logical database.
///
/// The database is dropped when the lease is released or goes out of scope,
/// so teardown happens on every exit path. Dropping is idempotent
/// (`DROP DATABASE IF EXISTS`), so an externally removed database does not
/// fail teardown.
#[derive(Debug)]
pub struct DatabaseLease {
    admin: AdminSession,
    name: DatabaseName,
    database_url: String,
    stage: DatabaseLifecycle,
    created_at: DateTime<Utc>,
}

impl DatabaseLease {
    const fn created(
        admin: AdminSession,
        name: DatabaseName,
        database_url: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            admin,
            name,
            database_url,
            stage: DatabaseLifecycle::Created,
            created_at,
        }
    }

    /// Returns the database name.
    #[must_use]
    pub const fn name(&self) -> &DatabaseName {
        &self.name
    }

    /// Returns the connection URL for this database.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.database_url
    }

    /// Returns the current lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> DatabaseLifecycle {
        self.stage
    }

    /// Returns when the database was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records that the migration chain has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::InvalidTransition`] when the lease is not
    /// in the created stage.
    pub fn mark_migrated(&mut self) -> Result<(), ProvisionerError> {
        self.stage.transition(DatabaseLifecycle::Migrated)
    }

    /// Records that a test has taken the database into use.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::InvalidTransition`] when the lease is not
    /// in the migrated stage.
    pub fn mark_in_use(&mut self) -> Result<(), ProvisionerError> {
        self.stage.transition(DatabaseLifecycle::InUse)
    }

    /// Drops the database now, surfacing any teardown error.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::Admin`] on connection or statement
    /// failure.
    pub fn release(mut self) -> Result<(), ProvisionerError> {
        self.drop_database_once()
    }

    fn drop_database_once(&mut self) -> Result<(), ProvisionerError> {
        if self.stage == DatabaseLifecycle::Dropped {
            return Ok(());
        }
        self.admin.drop_database(&self.name)?;
        self.stage.transition(DatabaseLifecycle::Dropped)
    }
}

impl Drop for DatabaseLease {
    fn drop(&mut self) {
        if let Err(err) = self.drop_database_once() {
            tracing::warn!(database = %self.name, error = %err, "lease teardown failed");
        }
    }
}
