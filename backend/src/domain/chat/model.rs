//! Provider-neutral conversation types exchanged with the language model, and
//! the conversion from UI messages into them.

use serde_json::{Value, json};

use super::message::{ToolState, UiMessage, UiPart, UiRole};

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments.
    pub parameters: Value,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// Result of a tool call fed back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: Value,
}

/// Content of an assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantContent {
    Text(String),
    ToolCall(ToolCall),
}

/// One message in the model conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelMessage {
    User { text: String },
    Assistant { content: Vec<AssistantContent> },
    Tool { results: Vec<ToolResult> },
}

/// A streaming completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system: String,
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// Incremental model output.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStreamEvent {
    TextDelta(String),
    ToolCall(ToolCall),
    Finish,
}

/// Convert UI messages into the model conversation.
///
/// User text becomes a user turn. Each step of an assistant message becomes
/// an assistant turn followed by a tool turn carrying the results of its
/// answered calls. Calls still awaiting input or output are dropped, as are
/// system messages and part types the model does not understand.
///
/// # Examples
/// ```
/// use hello_assistant::domain::chat::{to_model_messages, ModelMessage, UiMessage};
///
/// let messages = to_model_messages(&[UiMessage::user_text("Hi")]);
/// assert_eq!(messages, vec![ModelMessage::User { text: "Hi".to_owned() }]);
/// ```
#[must_use]
pub fn to_model_messages(messages: &[UiMessage]) -> Vec<ModelMessage> {
    let mut converted = Vec::new();
    for message in messages {
        match message.role {
            UiRole::User => {
                let text = message.text();
                if !text.is_empty() {
                    converted.push(ModelMessage::User { text });
                }
            }
            UiRole::Assistant => push_assistant_steps(&message.parts, &mut converted),
            UiRole::System => {}
        }
    }
    converted
}

fn push_assistant_steps(parts: &[UiPart], converted: &mut Vec<ModelMessage>) {
    for step in parts.split(|part| matches!(part, UiPart::StepStart)) {
        let mut content = Vec::new();
        let mut results = Vec::new();
        for part in step {
            match part {
                UiPart::Text { text } if !text.is_empty() => {
                    content.push(AssistantContent::Text(text.clone()));
                }
                UiPart::Tool(tool) => {
                    let output = match tool.state {
                        ToolState::OutputAvailable => tool.output.clone().unwrap_or(Value::Null),
                        ToolState::OutputError => {
                            json!({ "error": tool.error_text.clone().unwrap_or_default() })
                        }
                        ToolState::InputStreaming | ToolState::InputAvailable => continue,
                    };
                    content.push(AssistantContent::ToolCall(ToolCall {
                        id: tool.tool_call_id.clone(),
                        name: tool.tool_name.clone(),
                        input: tool.input.clone().unwrap_or(Value::Null),
                    }));
                    results.push(ToolResult {
                        tool_call_id: tool.tool_call_id.clone(),
                        tool_name: tool.tool_name.clone(),
                        output,
                    });
                }
                _ => {}
            }
        }
        if !content.is_empty() {
            converted.push(ModelMessage::Assistant { content });
        }
        if !results.is_empty() {
            converted.push(ModelMessage::Tool { results });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::message::ToolPart;
    use rstest::rstest;

    fn tool(id: &str, state: ToolState) -> UiPart {
        UiPart::Tool(ToolPart {
            tool_name: "reverseQuestion".to_owned(),
            tool_call_id: id.to_owned(),
            state,
            input: Some(json!({ "question": "Pick", "type": "text" })),
            output: (state == ToolState::OutputAvailable).then(|| json!({ "answer": "Rust" })),
            error_text: (state == ToolState::OutputError).then(|| "bad".to_owned()),
        })
    }

    #[rstest]
    fn answered_calls_become_call_and_result_pairs() {
        let mut assistant = UiMessage::assistant("a1");
        assistant.parts = vec![
            UiPart::StepStart,
            UiPart::text("Let me ask."),
            tool("c1", ToolState::OutputAvailable),
            tool("c2", ToolState::OutputError),
            tool("c3", ToolState::InputAvailable),
        ];

        let converted = to_model_messages(&[UiMessage::user_text("Help"), assistant]);

        assert_eq!(converted.len(), 3);
        let ModelMessage::Assistant { content } = &converted[1] else {
            panic!("expected assistant turn");
        };
        assert_eq!(content.len(), 3);
        let ModelMessage::Tool { results } = &converted[2] else {
            panic!("expected tool turn");
        };
        assert_eq!(results[0].output, json!({ "answer": "Rust" }));
        assert_eq!(results[1].output, json!({ "error": "bad" }));
    }

    #[rstest]
    fn steps_are_split_into_separate_turns() {
        let mut assistant = UiMessage::assistant("a1");
        assistant.parts = vec![
            UiPart::StepStart,
            tool("c1", ToolState::OutputAvailable),
            UiPart::StepStart,
            UiPart::text("Thanks!"),
        ];

        let converted = to_model_messages(&[assistant]);

        assert!(matches!(converted[0], ModelMessage::Assistant { .. }));
        assert!(matches!(converted[1], ModelMessage::Tool { .. }));
        assert_eq!(
            converted[2],
            ModelMessage::Assistant {
                content: vec![AssistantContent::Text("Thanks!".to_owned())]
            }
        );
    }

    #[rstest]
    fn pending_calls_and_system_messages_are_dropped() {
        let mut assistant = UiMessage::assistant("a1");
        assistant.parts = vec![tool("c1", ToolState::InputStreaming)];
        let system = UiMessage {
            id: "s".to_owned(),
            role: UiRole::System,
            parts: vec![UiPart::text("ignored")],
        };

        assert!(to_model_messages(&[system, assistant]).is_empty());
    }
}
