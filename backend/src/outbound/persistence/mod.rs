//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides the concrete implementation of the greeting
//! repository port backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling, plus the bootstrap that
//! selects, starts and migrates the datastore.
//!
//! # Architecture
//!
//! - **Thin adapters**: the repository only translates between Diesel rows
//!   and domain types.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database failures map to
//!   `GreetingRepositoryError` with the cause retained for logs.
//!
//! # Example
//!
//! ```ignore
//! use hello_assistant::outbound::persistence::{
//!     database_settings_from_env, BuildMode, Datastore, DieselGreetingRepository,
//! };
//!
//! let settings = database_settings_from_env(&mockable::DefaultEnv::new(), BuildMode::Debug)?;
//! let datastore = Datastore::connect(&settings).await?;
//! let repo = DieselGreetingRepository::new(datastore.pool().clone());
//! ```

mod config;
mod datastore;
mod diesel_basic_error_mapping;
mod diesel_greeting_repository;
mod embedded;
mod migrations;
mod models;
mod pool;
mod schema;

pub use config::{
    BuildMode, DEFAULT_EMBEDDED_DATA_PATH, DEFAULT_MAX_CONNECTIONS, DatabaseConfigError,
    DatabaseSettings, DatabaseTarget, database_settings_from_env,
};
pub use datastore::{Datastore, DatastoreError};
pub use diesel_greeting_repository::DieselGreetingRepository;
pub use embedded::{EMBEDDED_DATABASE_NAME, EmbeddedDatabase, EmbeddedDatabaseError};
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
