//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::Error`].
///
/// The body of every non-2xx JSON response.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Human-readable message returned to clients.
    #[schema(example = "Greeting not found")]
    error: String,
}

/// OpenAPI schema for [`crate::domain::Greeting`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Greeting)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct GreetingSchema {
    /// Positive row identifier.
    #[schema(minimum = 1, example = 1)]
    id: i64,
    /// Non-empty greeting text.
    #[schema(min_length = 1, example = "Hello from Rust + PostgreSQL!")]
    message: String,
}

/// OpenAPI schema for [`crate::domain::chat::ChatRequest`].
///
/// UI messages are documented loosely; their parts are open-ended.
#[derive(ToSchema)]
#[schema(as = crate::domain::chat::ChatRequest)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ChatRequestSchema {
    /// Conversation so far, oldest first.
    #[schema(value_type = Vec<Object>)]
    messages: Vec<serde_json::Value>,
}
