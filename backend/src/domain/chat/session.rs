//! Client-side chat state: folds stream chunks into UI messages, accepts tool
//! output, and decides when the conversation should be resent to the model.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use super::message::{ToolPart, ToolState, UiMessage, UiPart, UiRole};
use super::stream::UiMessageChunk;

/// Errors raised when submitting tool output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolOutputError {
    /// No tool part carries this call id.
    #[error("unknown tool call: {tool_call_id}")]
    UnknownToolCall { tool_call_id: String },
    /// The call is not in `input-available`.
    #[error("tool call {tool_call_id} is {state}, not awaiting output")]
    NotAwaitingOutput {
        tool_call_id: String,
        state: ToolState,
    },
}

/// Ordered conversation plus the bookkeeping needed to apply stream chunks.
///
/// # Examples
/// ```
/// use hello_assistant::domain::chat::{ChatSession, UiMessageChunk};
///
/// let mut session = ChatSession::new();
/// session.send_text("Hello");
/// session.apply(UiMessageChunk::TextStart { id: "t".to_owned() });
/// session.apply(UiMessageChunk::TextDelta { id: "t".to_owned(), delta: "Hi!".to_owned() });
/// assert_eq!(session.messages()[1].text(), "Hi!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<UiMessage>,
    streaming: bool,
    open_text: HashMap<String, usize>,
    last_error: Option<String>,
}

impl ChatSession {
    /// Empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation in order.
    #[must_use]
    pub fn messages(&self) -> &[UiMessage] {
        &self.messages
    }

    /// Text of the most recent `error` chunk, if the last stream failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Append a user message and close any open assistant message.
    pub fn send_text(&mut self, text: impl Into<String>) {
        self.close_stream();
        self.last_error = None;
        self.messages.push(UiMessage::user_text(text));
    }

    /// Fold one stream chunk into the current assistant message.
    ///
    /// `start` opens a new assistant message; any other chunk arriving while
    /// no assistant message is open opens one implicitly.
    pub fn apply(&mut self, chunk: UiMessageChunk) {
        if let UiMessageChunk::Start { message_id } = chunk {
            self.open_assistant(message_id);
            return;
        }
        if !self.streaming {
            self.open_assistant(None);
        }
        match chunk {
            UiMessageChunk::Start { .. } | UiMessageChunk::FinishStep => {}
            UiMessageChunk::StartStep => self.push_part(UiPart::StepStart),
            UiMessageChunk::TextStart { id } => self.start_text(id),
            UiMessageChunk::TextDelta { id, delta } => self.append_text(id, &delta),
            UiMessageChunk::TextEnd { id } => {
                self.open_text.remove(&id);
            }
            UiMessageChunk::ToolInputStart {
                tool_call_id,
                tool_name,
            } => {
                let _announced = self.tool_part(&tool_call_id, &tool_name);
            }
            UiMessageChunk::ToolInputDelta { .. } => {}
            UiMessageChunk::ToolInputAvailable {
                tool_call_id,
                tool_name,
                input,
            } => {
                if let Some(part) = self.tool_part(&tool_call_id, &tool_name) {
                    part.input = Some(input);
                    part.state = ToolState::InputAvailable;
                }
            }
            UiMessageChunk::ToolInputError {
                tool_call_id,
                tool_name,
                input,
                error_text,
            } => {
                if let Some(part) = self.tool_part(&tool_call_id, &tool_name) {
                    part.input = Some(input);
                    part.error_text = Some(error_text);
                    part.state = ToolState::OutputError;
                }
            }
            UiMessageChunk::ToolOutputAvailable {
                tool_call_id,
                output,
            } => {
                if let Some(part) = self.current_tool_part(&tool_call_id) {
                    part.output = Some(output);
                    part.state = ToolState::OutputAvailable;
                }
            }
            UiMessageChunk::ToolOutputError {
                tool_call_id,
                error_text,
            } => {
                if let Some(part) = self.current_tool_part(&tool_call_id) {
                    part.error_text = Some(error_text);
                    part.state = ToolState::OutputError;
                }
            }
            UiMessageChunk::Finish => self.close_stream(),
            UiMessageChunk::Error { error_text } => {
                self.last_error = Some(error_text);
                self.close_stream();
            }
        }
    }

    /// Submit the output of a tool call awaiting it.
    pub fn add_tool_output(
        &mut self,
        tool_call_id: &str,
        output: Value,
    ) -> Result<(), ToolOutputError> {
        let part = self.awaiting_part(tool_call_id)?;
        part.output = Some(output);
        part.state = ToolState::OutputAvailable;
        Ok(())
    }

    /// Mark a tool call awaiting output as failed.
    pub fn add_tool_error(
        &mut self,
        tool_call_id: &str,
        error_text: impl Into<String>,
    ) -> Result<(), ToolOutputError> {
        let part = self.awaiting_part(tool_call_id)?;
        part.error_text = Some(error_text.into());
        part.state = ToolState::OutputError;
        Ok(())
    }

    /// Tool calls in the last assistant message still waiting for output.
    pub fn pending_tool_calls(&self) -> impl Iterator<Item = &ToolPart> {
        self.messages
            .last()
            .filter(|message| message.role == UiRole::Assistant)
            .into_iter()
            .flat_map(UiMessage::tool_parts)
            .filter(|part| part.state == ToolState::InputAvailable)
    }

    /// Whether the conversation should be sent back to the model.
    ///
    /// True when the last message is from the assistant and every tool part
    /// of its last step has output. A step with no tool parts never triggers
    /// a resend, so a plain text reply ends the exchange.
    #[must_use]
    pub fn should_resend(&self) -> bool {
        let Some(last) = self.messages.last() else {
            return false;
        };
        if last.role != UiRole::Assistant {
            return false;
        }
        let step_begin = last
            .parts
            .iter()
            .rposition(|part| matches!(part, UiPart::StepStart))
            .map_or(0, |index| index + 1);
        let mut tools = last
            .parts
            .iter()
            .skip(step_begin)
            .filter_map(|part| match part {
                UiPart::Tool(tool) => Some(tool),
                _ => None,
            })
            .peekable();
        tools.peek().is_some() && tools.all(|tool| tool.state == ToolState::OutputAvailable)
    }

    fn open_assistant(&mut self, message_id: Option<String>) {
        self.open_text.clear();
        let id = message_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let continues_turn = self
            .messages
            .last()
            .is_some_and(|message| message.role == UiRole::Assistant && message.id == id);
        if !continues_turn {
            self.messages.push(UiMessage::assistant(id));
        }
        self.streaming = true;
    }

    fn close_stream(&mut self) {
        self.streaming = false;
        self.open_text.clear();
    }

    /// Trailing assistant message, opened implicitly when the last message
    /// belongs to the user.
    fn current(&mut self) -> Option<&mut UiMessage> {
        if !self
            .messages
            .last()
            .is_some_and(|message| message.role == UiRole::Assistant)
        {
            self.messages
                .push(UiMessage::assistant(Uuid::new_v4().to_string()));
        }
        self.messages.last_mut()
    }

    fn push_part(&mut self, part: UiPart) {
        if let Some(message) = self.current() {
            message.parts.push(part);
        }
    }

    fn start_text(&mut self, id: String) {
        let Some(message) = self.current() else {
            return;
        };
        let index = message.parts.len();
        message.parts.push(UiPart::text(""));
        self.open_text.insert(id, index);
    }

    fn append_text(&mut self, id: String, delta: &str) {
        if !self.open_text.contains_key(&id) {
            self.start_text(id.clone());
        }
        let index = self.open_text.get(&id).copied();
        let Some(message) = self.current() else {
            return;
        };
        if let Some(UiPart::Text { text }) = index.and_then(|index| message.parts.get_mut(index)) {
            text.push_str(delta);
        }
    }

    fn current_tool_part(&mut self, tool_call_id: &str) -> Option<&mut ToolPart> {
        self.current()?.tool_part_mut(tool_call_id)
    }

    fn tool_part(&mut self, tool_call_id: &str, tool_name: &str) -> Option<&mut ToolPart> {
        let message = self.current()?;
        if message.tool_part_mut(tool_call_id).is_none() {
            message
                .parts
                .push(UiPart::Tool(ToolPart::streaming(tool_call_id, tool_name)));
        }
        message.tool_part_mut(tool_call_id)
    }

    fn awaiting_part(&mut self, tool_call_id: &str) -> Result<&mut ToolPart, ToolOutputError> {
        let part = self
            .messages
            .iter_mut()
            .rev()
            .find_map(|message| message.tool_part_mut(tool_call_id))
            .ok_or_else(|| ToolOutputError::UnknownToolCall {
                tool_call_id: tool_call_id.to_owned(),
            })?;
        if part.state != ToolState::InputAvailable {
            return Err(ToolOutputError::NotAwaitingOutput {
                tool_call_id: tool_call_id.to_owned(),
                state: part.state,
            });
        }
        Ok(part)
    }
}
