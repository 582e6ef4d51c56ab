//! Builders for HTTP state ports.
//!
//! Each port gets its real adapter when the collaborator is configured and
//! the fixture otherwise, so the server always starts.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use hello_assistant::domain::ports::{
    AssistantChat, FixtureGreetingQuery, FixtureLanguageModel, GreetingQuery,
};
use hello_assistant::domain::{AssistantService, GreetingService};
use hello_assistant::inbound::http::state::HttpState;
use hello_assistant::outbound::gemini::{AssistantSettings, GeminiLanguageModel};
use hello_assistant::outbound::persistence::{DbPool, DieselGreetingRepository};

use super::ServerConfig;

/// Build the shared HTTP state from configuration.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the language model client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let greetings = build_greeting_query(config.db_pool.as_ref());
    let assistant = build_assistant_chat(&config.assistant)?;
    Ok(web::Data::new(HttpState::new(greetings, assistant)))
}

fn build_greeting_query(pool: Option<&DbPool>) -> Arc<dyn GreetingQuery> {
    match pool {
        Some(pool) => Arc::new(GreetingService::new(Arc::new(
            DieselGreetingRepository::new(pool.clone()),
        ))),
        None => Arc::new(FixtureGreetingQuery),
    }
}

fn build_assistant_chat(settings: &AssistantSettings) -> std::io::Result<Arc<dyn AssistantChat>> {
    let model = GeminiLanguageModel::from_settings(settings).map_err(|err| {
        std::io::Error::other(format!("language model client setup failed: {err}"))
    })?;
    Ok(match model {
        Some(model) => {
            info!(model = settings.model(), "assistant uses the hosted language model");
            Arc::new(AssistantService::new(Arc::new(model)))
        }
        None => {
            warn!("ASSISTANT_API_KEY is not set; assistant uses the scripted fixture model");
            Arc::new(AssistantService::new(Arc::new(FixtureLanguageModel)))
        }
    })
}
