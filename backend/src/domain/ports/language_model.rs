//! Driven port for streaming completions from a hosted language model.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::{Value, json};
use uuid::Uuid;

use super::define_port_error;
use crate::domain::REVERSE_QUESTION_TOOL_NAME;
use crate::domain::chat::{ModelMessage, ModelRequest, ModelStreamEvent, ToolCall};

define_port_error! {
    /// Errors surfaced by language model adapters.
    pub enum LanguageModelError {
        /// The provider could not be reached.
        Connection { message: String } => "language model connection failed: {message}",
        /// The provider refused the request.
        Rejected { message: String } => "language model rejected the request: {message}",
        /// The provider answered with an unreadable stream.
        Protocol { message: String } => "language model stream was malformed: {message}",
    }
}

/// Incremental model output in arrival order.
pub type ModelEventStream = BoxStream<'static, Result<ModelStreamEvent, LanguageModelError>>;

/// Port for a streaming, tool-calling language model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Open a completion stream for `request`.
    ///
    /// Failures before the first event are returned directly; failures while
    /// streaming arrive as `Err` items.
    async fn stream(&self, request: ModelRequest) -> Result<ModelEventStream, LanguageModelError>;
}

/// Scripted model used when no provider credentials are configured.
///
/// Asks one fixed select question unless the last turn answered a reverse
/// question, in which case it acknowledges the answer in text.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLanguageModel;

impl FixtureLanguageModel {
    fn answered_question(request: &ModelRequest) -> Option<String> {
        let Some(ModelMessage::Tool { results }) = request.messages.last() else {
            return None;
        };
        results
            .iter()
            .filter(|result| result.tool_name == REVERSE_QUESTION_TOOL_NAME)
            .find_map(|result| result.output.get("answer").and_then(Value::as_str))
            .map(str::to_owned)
    }

    fn question() -> Value {
        json!({
            "question": "どのプログラミング言語について知りたいですか？",
            "type": "select",
            "options": [
                { "label": "TypeScript", "value": "typescript" },
                { "label": "Rust", "value": "rust", "description": "安全性と速度を重視" }
            ]
        })
    }
}

#[async_trait]
impl LanguageModel for FixtureLanguageModel {
    async fn stream(&self, request: ModelRequest) -> Result<ModelEventStream, LanguageModelError> {
        let events = match Self::answered_question(&request) {
            Some(answer) => vec![
                ModelStreamEvent::TextDelta("ご回答ありがとうございます。".to_owned()),
                ModelStreamEvent::TextDelta(format!("「{answer}」を踏まえてお答えします。")),
                ModelStreamEvent::Finish,
            ],
            None => vec![
                ModelStreamEvent::ToolCall(ToolCall {
                    id: format!("call_{}", Uuid::new_v4().simple()),
                    name: REVERSE_QUESTION_TOOL_NAME.to_owned(),
                    input: Self::question(),
                }),
                ModelStreamEvent::Finish,
            ],
        };
        Ok(stream::iter(events.into_iter().map(Ok)).boxed())
    }
}
