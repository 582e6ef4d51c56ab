//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the schema wrappers that describe domain types without coupling them
//! to utoipa. The document is served by Swagger UI in debug builds and
//! printed by `cargo run --bin openapi-dump`.

use crate::inbound::http::greeting::GreetingResponse;
use crate::inbound::http::schemas::{ChatRequestSchema, ErrorSchema, GreetingSchema};
use utoipa::OpenApi;

/// OpenAPI document for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hello assistant API",
        description = "Greeting lookup, streaming assistant chat and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::greeting::get_greeting,
        crate::inbound::http::assistant::chat,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        GreetingResponse,
        GreetingSchema,
        ChatRequestSchema,
        ErrorSchema
    )),
    tags(
        (name = "greetings", description = "Greeting lookup"),
        (name = "assistant", description = "Streaming chat with reverse questions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
