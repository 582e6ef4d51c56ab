//! Chat conversation model, stream protocol and client-side state.

mod message;
mod model;
mod session;
mod stream;
mod view;

use serde::{Deserialize, Serialize};

pub use message::{ToolPart, ToolState, UiMessage, UiPart, UiRole};
pub use model::{
    AssistantContent, ModelMessage, ModelRequest, ModelStreamEvent, ToolCall, ToolDefinition,
    ToolResult, to_model_messages,
};
pub use session::{ChatSession, ToolOutputError};
pub use stream::UiMessageChunk;
pub use view::{
    FAILED_TEXT, FormError, MISSING_OPTIONS_TEXT, PREPARING_TEXT, QuestionForm, RECEIVING_TEXT,
    SELECT_PLACEHOLDER, SUBMIT_LABEL, SUBMITTED_TEXT, ToolPartView,
};

/// Body of a chat request: the whole conversation so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<UiMessage>,
}
