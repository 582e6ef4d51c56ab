//! Datastore bootstrap shared by the server and the seeding binary.
//!
//! Resolves the configured target to a URL, applies pending migrations and
//! builds the connection pool.

use tracing::info;

use super::config::{DatabaseSettings, DatabaseTarget};
use super::embedded::{EmbeddedDatabase, EmbeddedDatabaseError};
use super::migrations::{MigrationError, run_pending_migrations};
use super::pool::{DbPool, PoolConfig, PoolError};

/// Errors raised while bringing the datastore up or down.
#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error(transparent)]
    Embedded(#[from] EmbeddedDatabaseError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// A migrated datastore with its connection pool.
pub struct Datastore {
    pool: DbPool,
    embedded: Option<EmbeddedDatabase>,
}

impl Datastore {
    /// Start or connect to the configured datastore and migrate it.
    ///
    /// # Errors
    ///
    /// Returns [`DatastoreError`] when the embedded instance fails to start,
    /// a migration fails or the pool cannot be built.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DatastoreError> {
        let (url, embedded, tls) = match &settings.target {
            DatabaseTarget::Embedded { data_path } => {
                let embedded = EmbeddedDatabase::start(data_path).await?;
                (embedded.url().to_owned(), Some(embedded), false)
            }
            DatabaseTarget::Networked { url } => (url.clone(), None, settings.ssl),
        };

        run_pending_migrations(&url).await?;
        let pool = DbPool::new(
            PoolConfig::new(url)
                .with_max_size(settings.max_connections)
                .with_tls(tls),
        )
        .await?;
        info!(
            embedded = embedded.is_some(),
            max_connections = settings.max_connections,
            "datastore ready"
        );

        Ok(Self { pool, embedded })
    }

    /// Connection pool for repositories.
    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Stop the embedded instance, if one was started.
    ///
    /// # Errors
    ///
    /// Returns [`DatastoreError::Embedded`] when stopping fails.
    pub async fn shutdown(self) -> Result<(), DatastoreError> {
        if let Some(embedded) = self.embedded {
            embedded.stop().await?;
        }
        Ok(())
    }
}
