//! Domain types, services and ports.
//!
//! Purpose: hold the transport-agnostic core. Inbound adapters call the
//! driving ports implemented by the services here; the services reach the
//! outside world only through driven ports implemented in `outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: the error payload used at the HTTP edge.
//! - Greeting: the entity served by the hello endpoint.
//! - ReverseQuestionInput / ReverseQuestionOutput: the clarifying-question
//!   tool's arguments and answer.
//! - GreetingService / AssistantService: the service layer.
//! - TraceId: request correlation identifier.

pub mod assistant_service;
pub mod chat;
pub mod error;
pub mod greeting;
pub mod greeting_service;
pub mod ports;
pub mod result_ext;
pub mod reverse_question;
pub mod trace_id;

pub use self::assistant_service::{AssistantService, ChunkEncoder, SYSTEM_PROMPT};
pub use self::error::{Error, ErrorCode};
pub use self::greeting::{Greeting, GreetingId, GreetingMessage, GreetingValidationError};
pub use self::greeting_service::GreetingService;
pub use self::result_ext::ResultExt;
pub use self::reverse_question::{
    QuestionOption, QuestionType, REVERSE_QUESTION_DESCRIPTION, REVERSE_QUESTION_TOOL_NAME,
    ReverseQuestionInput, ReverseQuestionOutput, ReverseQuestionValidationError,
    reverse_question_schema, reverse_question_tool,
};
pub use self::trace_id::TraceId;

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use hello_assistant::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("Greeting not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
