//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`GreetingRepository`, `LanguageModel`) are implemented by
//! outbound adapters; driving ports (`GreetingQuery`, `AssistantChat`) are
//! implemented by domain services and called by inbound adapters. Each port
//! ships a fixture so the server can run without external collaborators.

mod macros;
pub(crate) use macros::define_port_error;

mod assistant_chat;
mod greeting_query;
mod greeting_repository;
mod language_model;

#[cfg(test)]
pub use assistant_chat::MockAssistantChat;
pub use assistant_chat::{AssistantChat, AssistantChatError, FixtureAssistantChat, UiChunkStream};
#[cfg(test)]
pub use greeting_query::MockGreetingQuery;
pub use greeting_query::{FixtureGreetingQuery, GreetingQuery};
#[cfg(test)]
pub use greeting_repository::MockGreetingRepository;
pub use greeting_repository::{
    ErrorCause, FIXTURE_GREETING_ID, FIXTURE_GREETING_MESSAGE,
    GREETING_FETCH_FAILED_MESSAGE, GREETING_NOT_FOUND_MESSAGE, GREETING_SEED_FAILED_MESSAGE,
    GreetingRepository, GreetingRepositoryError, GreetingRepositoryErrorKind,
};
#[cfg(test)]
pub use language_model::MockLanguageModel;
pub use language_model::{FixtureLanguageModel, LanguageModel, LanguageModelError, ModelEventStream};
