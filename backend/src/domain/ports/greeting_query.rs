//! Driving port used by inbound adapters to read the current greeting.

use async_trait::async_trait;

use super::greeting_repository::fixture_greeting;
use crate::domain::Greeting;
use crate::domain::ports::GreetingRepositoryError;

/// Use-case port for the hello endpoint.
///
/// Errors are the repository's, passed through unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GreetingQuery: Send + Sync {
    /// Return the most recent greeting.
    async fn latest_greeting(&self) -> Result<Greeting, GreetingRepositoryError>;
}

/// Fixture query used when no datastore is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGreetingQuery;

#[async_trait]
impl GreetingQuery for FixtureGreetingQuery {
    async fn latest_greeting(&self) -> Result<Greeting, GreetingRepositoryError> {
        fixture_greeting()
    }
}
