//! Embedded PostgreSQL for local development.
//!
//! The instance keeps its cluster under the configured data directory so
//! greetings survive restarts, and serves a single `hello` database.

use std::path::{Path, PathBuf};

use postgresql_embedded::{PostgreSQL, Settings};
use tracing::info;

/// Database created inside the embedded cluster.
pub const EMBEDDED_DATABASE_NAME: &str = "hello";

// The cluster is initialised once per data directory, so the password must
// stay the same across runs.
const EMBEDDED_PASSWORD: &str = "hello-embedded";

/// Errors raised while managing the embedded instance.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddedDatabaseError {
    /// The data directory could not be created.
    #[error("failed to create embedded data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// `postgresql_embedded` failed during the named operation.
    #[error("embedded postgres {operation} failed: {source}")]
    Postgres {
        operation: &'static str,
        #[source]
        source: postgresql_embedded::Error,
    },
}

impl EmbeddedDatabaseError {
    fn postgres(operation: &'static str) -> impl FnOnce(postgresql_embedded::Error) -> Self {
        move |source| Self::Postgres { operation, source }
    }
}

/// A running embedded PostgreSQL instance.
pub struct EmbeddedDatabase {
    postgres: PostgreSQL,
    url: String,
}

impl EmbeddedDatabase {
    /// Start (initialising on first use) the cluster under `data_path` and
    /// ensure the `hello` database exists.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddedDatabaseError`] when the directory cannot be created
    /// or PostgreSQL fails to set up, start or create the database.
    pub async fn start(data_path: &Path) -> Result<Self, EmbeddedDatabaseError> {
        std::fs::create_dir_all(data_path).map_err(|source| EmbeddedDatabaseError::DataDir {
            path: data_path.to_path_buf(),
            source,
        })?;

        let settings = Settings {
            data_dir: data_path.join("data"),
            password_file: data_path.join(".pgpass"),
            password: EMBEDDED_PASSWORD.to_owned(),
            temporary: false,
            ..Settings::default()
        };
        let mut postgres = PostgreSQL::new(settings);
        postgres
            .setup()
            .await
            .map_err(EmbeddedDatabaseError::postgres("setup"))?;
        postgres
            .start()
            .await
            .map_err(EmbeddedDatabaseError::postgres("start"))?;
        let exists = postgres
            .database_exists(EMBEDDED_DATABASE_NAME)
            .await
            .map_err(EmbeddedDatabaseError::postgres("database lookup"))?;
        if !exists {
            postgres
                .create_database(EMBEDDED_DATABASE_NAME)
                .await
                .map_err(EmbeddedDatabaseError::postgres("create database"))?;
        }
        let url = postgres.settings().url(EMBEDDED_DATABASE_NAME);
        info!(data_path = %data_path.display(), port = postgres.settings().port, "embedded postgres started");

        Ok(Self { postgres, url })
    }

    /// Connection URL for the `hello` database.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the instance.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddedDatabaseError::Postgres`] when `pg_ctl stop` fails.
    pub async fn stop(self) -> Result<(), EmbeddedDatabaseError> {
        self.postgres
            .stop()
            .await
            .map_err(EmbeddedDatabaseError::postgres("stop"))?;
        info!("embedded postgres stopped");
        Ok(())
    }
}
