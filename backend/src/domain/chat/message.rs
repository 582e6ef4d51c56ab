//! UI message model exchanged between chat clients and the assistant endpoint.
//!
//! Messages are ordered lists of parts. Tool invocations appear as parts
//! whose `type` is `tool-<name>` and whose `state` follows
//! `input-streaming → input-available → (output-available | output-error)`.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

const TOOL_PART_PREFIX: &str = "tool-";

/// Author of a UI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiRole {
    System,
    User,
    Assistant,
}

/// Lifecycle state of one tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    /// Arguments are still arriving.
    InputStreaming,
    /// Arguments are complete and the call awaits output.
    InputAvailable,
    /// Output was submitted. Terminal.
    OutputAvailable,
    /// Input or output failed. Terminal.
    OutputError,
}

impl ToolState {
    /// Wire name of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputStreaming => "input-streaming",
            Self::InputAvailable => "input-available",
            Self::OutputAvailable => "output-available",
            Self::OutputError => "output-error",
        }
    }

    /// Whether no further transition is allowed.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::OutputAvailable | Self::OutputError)
    }
}

impl std::fmt::Display for ToolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool invocation embedded in an assistant message.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPart {
    /// Name of the invoked tool, taken from the part type suffix.
    pub tool_name: String,
    /// Identifier correlating input, output and stream chunks.
    pub tool_call_id: String,
    /// Current lifecycle state.
    pub state: ToolState,
    /// Tool arguments once known.
    pub input: Option<Value>,
    /// Submitted output.
    pub output: Option<Value>,
    /// Failure description for `output-error`.
    pub error_text: Option<String>,
}

impl ToolPart {
    /// A freshly announced call whose arguments are still streaming.
    #[must_use]
    pub fn streaming(tool_call_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_call_id: tool_call_id.into(),
            state: ToolState::InputStreaming,
            input: None,
            output: None,
            error_text: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolPartWire {
    tool_call_id: String,
    state: ToolState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_text: Option<String>,
}

/// One part of a UI message.
///
/// Part types this crate does not interpret are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum UiPart {
    /// Plain text.
    Text { text: String },
    /// Boundary between model steps within one assistant message.
    StepStart,
    /// Tool invocation.
    Tool(ToolPart),
    /// Any other part, kept as received.
    Other(Value),
}

impl UiPart {
    /// Text part helper.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

impl TryFrom<Value> for UiPart {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| serde_json::Error::custom("message part is missing its type"))?
            .to_owned();

        match kind.as_str() {
            "text" => {
                let text = value
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| serde_json::Error::custom("text part is missing its text"))?;
                Ok(Self::text(text))
            }
            "step-start" => Ok(Self::StepStart),
            other => match other.strip_prefix(TOOL_PART_PREFIX) {
                Some(tool_name) if !tool_name.is_empty() => {
                    let wire: ToolPartWire = serde_json::from_value(value)?;
                    Ok(Self::Tool(ToolPart {
                        tool_name: tool_name.to_owned(),
                        tool_call_id: wire.tool_call_id,
                        state: wire.state,
                        input: wire.input,
                        output: wire.output,
                        error_text: wire.error_text,
                    }))
                }
                _ => Ok(Self::Other(value)),
            },
        }
    }
}

impl From<UiPart> for Value {
    fn from(part: UiPart) -> Self {
        match part {
            UiPart::Text { text } => serde_json::json!({ "type": "text", "text": text }),
            UiPart::StepStart => serde_json::json!({ "type": "step-start" }),
            UiPart::Tool(tool) => {
                let wire = ToolPartWire {
                    tool_call_id: tool.tool_call_id,
                    state: tool.state,
                    input: tool.input,
                    output: tool.output,
                    error_text: tool.error_text,
                };
                let mut object = match serde_json::to_value(wire) {
                    Ok(Value::Object(object)) => object,
                    _ => Map::new(),
                };
                object.insert(
                    "type".to_owned(),
                    Value::String(format!("{TOOL_PART_PREFIX}{}", tool.tool_name)),
                );
                Value::Object(object)
            }
            UiPart::Other(value) => value,
        }
    }
}

/// A chat message as rendered by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiMessage {
    /// Client- or server-assigned identifier.
    pub id: String,
    /// Author.
    pub role: UiRole,
    /// Ordered content.
    #[serde(default)]
    pub parts: Vec<UiPart>,
}

impl UiMessage {
    /// A user message holding one text part.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: UiRole::User,
            parts: vec![UiPart::text(text)],
        }
    }

    /// An empty assistant message.
    #[must_use]
    pub fn assistant(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: UiRole::Assistant,
            parts: Vec::new(),
        }
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                UiPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool parts in order.
    pub fn tool_parts(&self) -> impl Iterator<Item = &ToolPart> {
        self.parts.iter().filter_map(|part| match part {
            UiPart::Tool(tool) => Some(tool),
            _ => None,
        })
    }

    /// Mutable lookup of a tool part by call id.
    pub fn tool_part_mut(&mut self, tool_call_id: &str) -> Option<&mut ToolPart> {
        self.parts.iter_mut().find_map(|part| match part {
            UiPart::Tool(tool) if tool.tool_call_id == tool_call_id => Some(tool),
            _ => None,
        })
    }
}
