//! DTOs for the Gemini `streamGenerateContent` wire format.
//!
//! Requests are built from provider-neutral [`ModelRequest`] values; each
//! streamed response frame decodes into [`ModelStreamEvent`]s in one pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::chat::{
    AssistantContent, ModelMessage, ModelRequest, ModelStreamEvent, ToolCall, ToolDefinition,
    ToolResult,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateRequestDto {
    pub(super) system_instruction: ContentDto,
    pub(super) contents: Vec<ContentDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(super) tools: Vec<ToolsDto>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub(super) struct ContentDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) role: Option<String>,
    #[serde(default)]
    pub(super) parts: Vec<PartDto>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct PartDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) function_call: Option<FunctionCallDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) function_response: Option<FunctionResponseDto>,
    /// Marks reasoning summaries, which are not part of the reply.
    #[serde(default, skip_serializing)]
    pub(super) thought: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct FunctionCallDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<String>,
    pub(super) name: String,
    #[serde(default)]
    pub(super) args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct FunctionResponseDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<String>,
    pub(super) name: String,
    pub(super) response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ToolsDto {
    pub(super) function_declarations: Vec<FunctionDeclarationDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct FunctionDeclarationDto {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateResponseDto {
    #[serde(default)]
    pub(super) candidates: Vec<CandidateDto>,
    pub(super) error: Option<ApiErrorDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CandidateDto {
    #[serde(default)]
    pub(super) content: ContentDto,
    pub(super) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDto {
    #[serde(default)]
    pub(super) message: String,
}

impl GenerateRequestDto {
    pub(super) fn from_request(request: &ModelRequest) -> Self {
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolsDto {
                function_declarations: request.tools.iter().map(declaration).collect(),
            }]
        };
        Self {
            system_instruction: ContentDto {
                role: None,
                parts: vec![PartDto::text(&request.system)],
            },
            contents: request.messages.iter().map(content).collect(),
            tools,
        }
    }
}

impl PartDto {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            ..Self::default()
        }
    }
}

fn declaration(tool: &ToolDefinition) -> FunctionDeclarationDto {
    FunctionDeclarationDto {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: tool.parameters.clone(),
    }
}

fn content(message: &ModelMessage) -> ContentDto {
    match message {
        ModelMessage::User { text } => ContentDto {
            role: Some("user".to_owned()),
            parts: vec![PartDto::text(text)],
        },
        ModelMessage::Assistant { content } => ContentDto {
            role: Some("model".to_owned()),
            parts: content.iter().map(assistant_part).collect(),
        },
        ModelMessage::Tool { results } => ContentDto {
            role: Some("user".to_owned()),
            parts: results.iter().map(result_part).collect(),
        },
    }
}

fn assistant_part(content: &AssistantContent) -> PartDto {
    match content {
        AssistantContent::Text(text) => PartDto::text(text),
        AssistantContent::ToolCall(call) => PartDto {
            function_call: Some(FunctionCallDto {
                id: Some(call.id.clone()),
                name: call.name.clone(),
                args: call.input.clone(),
            }),
            ..PartDto::default()
        },
    }
}

fn result_part(result: &ToolResult) -> PartDto {
    // functionResponse.response must be a JSON object.
    let response = match &result.output {
        Value::Object(_) => result.output.clone(),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert("result".to_owned(), other.clone());
            Value::Object(wrapped)
        }
    };
    PartDto {
        function_response: Some(FunctionResponseDto {
            id: Some(result.tool_call_id.clone()),
            name: result.tool_name.clone(),
            response,
        }),
        ..PartDto::default()
    }
}

impl GenerateResponseDto {
    /// Map one streamed frame into model events.
    ///
    /// Only the first candidate is read. A frame carrying a `finishReason`
    /// does not emit [`ModelStreamEvent::Finish`]; the adapter emits that
    /// once the HTTP body ends.
    pub(super) fn into_events(self) -> Result<Vec<ModelStreamEvent>, String> {
        if let Some(error) = self.error {
            return Err(error.message);
        }
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(Vec::new());
        };
        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|reason| is_blocked(reason))
        {
            return Err(format!("generation stopped: {reason}"));
        }
        Ok(candidate
            .content
            .parts
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(PartDto::into_event)
            .collect())
    }
}

impl PartDto {
    fn into_event(self) -> Option<ModelStreamEvent> {
        if let Some(call) = self.function_call {
            return Some(ModelStreamEvent::ToolCall(ToolCall {
                id: call
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple())),
                name: call.name,
                input: call.args,
            }));
        }
        self.text
            .filter(|text| !text.is_empty())
            .map(ModelStreamEvent::TextDelta)
    }
}

fn is_blocked(reason: &str) -> bool {
    matches!(
        reason,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" | "MALFORMED_FUNCTION_CALL"
    )
}
