//! Chunks of the UI message stream sent from the assistant endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One incremental update to the assistant message being streamed.
///
/// Serialised as `type`-tagged JSON objects with camelCase fields, e.g.
/// `{"type":"text-delta","id":"t1","delta":"Hi"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum UiMessageChunk {
    /// Opens a new assistant message.
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    /// Opens a model step.
    StartStep,
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    /// A tool call was announced; arguments follow.
    ToolInputStart {
        tool_call_id: String,
        tool_name: String,
    },
    ToolInputDelta {
        tool_call_id: String,
        input_text_delta: String,
    },
    /// Arguments are complete and valid.
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },
    /// Arguments failed validation; the call is terminal.
    ToolInputError {
        tool_call_id: String,
        tool_name: String,
        input: Value,
        error_text: String,
    },
    ToolOutputAvailable {
        tool_call_id: String,
        output: Value,
    },
    ToolOutputError {
        tool_call_id: String,
        error_text: String,
    },
    /// Closes a model step.
    FinishStep,
    /// Closes the assistant message.
    Finish,
    /// The stream failed; nothing follows.
    Error {
        error_text: String,
    },
}
