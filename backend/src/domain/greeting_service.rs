//! Greeting read use-case.
//!
//! A pass-through over the repository today; business rules such as caching
//! or enrichment would live here without changing the handler or repository
//! contracts.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::Greeting;
use crate::domain::ports::{
    GreetingQuery, GreetingRepository, GreetingRepositoryError, GreetingRepositoryErrorKind,
};
use crate::domain::result_ext::ResultExt;

/// Service implementing [`GreetingQuery`] over a [`GreetingRepository`].
#[derive(Clone)]
pub struct GreetingService<R> {
    repository: Arc<R>,
}

impl<R> GreetingService<R> {
    /// Create the service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> GreetingQuery for GreetingService<R>
where
    R: GreetingRepository,
{
    async fn latest_greeting(&self) -> Result<Greeting, GreetingRepositoryError> {
        self.repository
            .get_latest()
            .await
            .tap(|greeting| debug!(greeting_id = %greeting.id(), "greeting loaded"))
            .tap_err(|err| match err.kind() {
                GreetingRepositoryErrorKind::NotFound => debug!("no greeting stored"),
                GreetingRepositoryErrorKind::Database => debug!(
                    error_type = err.kind().as_str(),
                    has_cause = err.cause().is_some(),
                    "greeting lookup failed"
                ),
            })
    }
}
