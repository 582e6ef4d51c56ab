//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AssistantChat, FixtureAssistantChat, FixtureGreetingQuery, GreetingQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub greetings: Arc<dyn GreetingQuery>,
    pub assistant: Arc<dyn AssistantChat>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use hello_assistant::domain::ports::{FixtureAssistantChat, FixtureGreetingQuery};
    /// use hello_assistant::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureGreetingQuery), Arc::new(FixtureAssistantChat));
    /// let _greetings = state.greetings.clone();
    /// ```
    pub fn new(greetings: Arc<dyn GreetingQuery>, assistant: Arc<dyn AssistantChat>) -> Self {
        Self {
            greetings,
            assistant,
        }
    }

    /// State wired entirely to fixtures.
    pub fn fixtures() -> Self {
        Self::new(Arc::new(FixtureGreetingQuery), Arc::new(FixtureAssistantChat))
    }
}
