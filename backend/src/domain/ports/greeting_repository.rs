//! Driven port for the greetings table.
//!
//! The repository is the only step of the greeting read path that produces
//! errors. Upper layers pass its errors through untouched; only the HTTP
//! adapter translates them.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Greeting, GreetingMessage};

/// Message returned when the table holds no greeting.
pub const GREETING_NOT_FOUND_MESSAGE: &str = "Greeting not found";
/// Message returned when reading the latest greeting fails.
pub const GREETING_FETCH_FAILED_MESSAGE: &str = "Failed to fetch greeting from database";
/// Message returned when seeding a greeting fails.
pub const GREETING_SEED_FAILED_MESSAGE: &str = "Failed to seed greeting";

/// Shareable, opaque underlying failure.
pub type ErrorCause = Arc<dyn StdError + Send + Sync + 'static>;

/// Discriminant of [`GreetingRepositoryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GreetingRepositoryErrorKind {
    NotFound,
    Database,
}

impl GreetingRepositoryErrorKind {
    /// Stable tag used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Database => "database_error",
        }
    }
}

/// Errors surfaced by greeting repositories.
///
/// `cause` is kept for server-side diagnostics and is never serialised.
#[derive(Debug, Clone)]
pub enum GreetingRepositoryError {
    /// No greeting exists.
    NotFound { message: String },
    /// Connectivity, query or integrity failure.
    Database {
        message: String,
        cause: Option<ErrorCause>,
    },
}

impl GreetingRepositoryError {
    /// The table is empty.
    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound {
            message: GREETING_NOT_FOUND_MESSAGE.to_owned(),
        }
    }

    /// A database failure with a message and no captured cause.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            cause: None,
        }
    }

    /// Reading the latest greeting failed because of `cause`.
    pub fn fetch_failed(cause: impl StdError + Send + Sync + 'static) -> Self {
        Self::database(GREETING_FETCH_FAILED_MESSAGE).with_cause(cause)
    }

    /// Attach an underlying cause to a database error.
    #[must_use]
    pub fn with_cause(self, cause: impl StdError + Send + Sync + 'static) -> Self {
        match self {
            Self::Database { message, .. } => Self::Database {
                message,
                cause: Some(Arc::new(cause)),
            },
            other @ Self::NotFound { .. } => other,
        }
    }

    /// Discriminant.
    #[must_use]
    pub fn kind(&self) -> GreetingRepositoryErrorKind {
        match self {
            Self::NotFound { .. } => GreetingRepositoryErrorKind::NotFound,
            Self::Database { .. } => GreetingRepositoryErrorKind::Database,
        }
    }

    /// Client-safe message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { message } | Self::Database { message, .. } => message.as_str(),
        }
    }

    /// Underlying failure, if captured.
    #[must_use]
    pub fn cause(&self) -> Option<&ErrorCause> {
        match self {
            Self::Database { cause, .. } => cause.as_ref(),
            Self::NotFound { .. } => None,
        }
    }
}

impl fmt::Display for GreetingRepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for GreetingRepositoryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause().map(|cause| cause.as_ref() as &(dyn StdError + 'static))
    }
}

/// Port for reading and seeding greetings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GreetingRepository: Send + Sync {
    /// Fetch the greeting with the highest id. Issues exactly one query.
    async fn get_latest(&self) -> Result<Greeting, GreetingRepositoryError>;

    /// Insert `message` when the table is empty; report whether a row was
    /// written.
    async fn insert_if_empty(
        &self,
        message: &GreetingMessage,
    ) -> Result<bool, GreetingRepositoryError>;
}

/// Fixture id served by the in-process fixtures.
pub const FIXTURE_GREETING_ID: i64 = 1;
/// Fixture message served by the in-process fixtures.
pub const FIXTURE_GREETING_MESSAGE: &str = "Hello from the fixture greeting!";

pub(crate) fn fixture_greeting() -> Result<Greeting, GreetingRepositoryError> {
    Greeting::try_new(FIXTURE_GREETING_ID, FIXTURE_GREETING_MESSAGE)
        .map_err(|err| GreetingRepositoryError::database("invalid fixture greeting").with_cause(err))
}
