//! Chat orchestration: sends the conversation to the language model with the
//! reverse-question tool declared and relays its output as UI stream chunks.
//!
//! The model decides when to call the tool. This service only declares the
//! tool, validates the arguments the model produces, and translates model
//! events into chunks in arrival order.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::chat::{
    ModelRequest, ModelStreamEvent, ToolCall, UiMessage, UiMessageChunk, UiRole,
    to_model_messages,
};
use crate::domain::ports::{
    AssistantChat, AssistantChatError, LanguageModel, LanguageModelError, UiChunkStream,
};
use crate::domain::reverse_question::{
    REVERSE_QUESTION_TOOL_NAME, ReverseQuestionInput, reverse_question_tool,
};

/// Instruction given to the model on every request.
pub const SYSTEM_PROMPT: &str = "あなたは優秀なアシスタントです。ユーザーの質問に対して必ずreverseQuestionツールを使って逆質問をしてから回答してください。";

/// Service implementing [`AssistantChat`] over a [`LanguageModel`].
pub struct AssistantService<M> {
    model: Arc<M>,
}

impl<M> AssistantService<M> {
    /// Create the service.
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }
}

impl<M> Clone for AssistantService<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
        }
    }
}

/// Reuse the id of a trailing assistant message so a resent conversation
/// continues the same message on the client.
fn reply_message_id(messages: &[UiMessage]) -> String {
    messages
        .last()
        .filter(|message| message.role == UiRole::Assistant)
        .map_or_else(|| Uuid::new_v4().to_string(), |message| message.id.clone())
}

#[async_trait]
impl<M> AssistantChat for AssistantService<M>
where
    M: LanguageModel + 'static,
{
    async fn respond(&self, messages: Vec<UiMessage>) -> Result<UiChunkStream, AssistantChatError> {
        let request = ModelRequest {
            system: SYSTEM_PROMPT.to_owned(),
            messages: to_model_messages(&messages),
            tools: vec![reverse_question_tool()],
        };
        let events = self.model.stream(request).await.map_err(|err| {
            error!(error = %err, "language model stream could not start");
            match err {
                LanguageModelError::Connection { message } => {
                    AssistantChatError::model_unavailable(message)
                }
                LanguageModelError::Rejected { message } | LanguageModelError::Protocol { message } => {
                    AssistantChatError::model_failed(message)
                }
            }
        })?;

        let mut encoder = ChunkEncoder::new(reply_message_id(&messages));
        let opening = stream::iter(encoder.begin());
        let body = stream::unfold(Some((events, encoder)), |state| async move {
            let (mut events, mut encoder) = state?;
            match events.next().await {
                Some(Ok(event)) => {
                    let chunks = encoder.on_event(event);
                    Some((chunks, Some((events, encoder))))
                }
                Some(Err(err)) => {
                    error!(error = %err, "language model stream failed");
                    Some((encoder.fail(&err), None))
                }
                None => Some((encoder.finish(), None)),
            }
        })
        .flat_map(stream::iter);

        Ok(opening.chain(body).boxed())
    }
}

/// Translates model events into UI chunks, tracking the open text block.
#[derive(Debug)]
pub struct ChunkEncoder {
    message_id: String,
    text_id: Option<String>,
    finished: bool,
}

impl ChunkEncoder {
    /// Encoder for the assistant message `message_id`.
    #[must_use]
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            text_id: None,
            finished: false,
        }
    }

    /// Chunks opening the message and its first step.
    #[must_use]
    pub fn begin(&self) -> Vec<UiMessageChunk> {
        vec![
            UiMessageChunk::Start {
                message_id: Some(self.message_id.clone()),
            },
            UiMessageChunk::StartStep,
        ]
    }

    /// Chunks for one model event.
    pub fn on_event(&mut self, event: ModelStreamEvent) -> Vec<UiMessageChunk> {
        let mut chunks = Vec::new();
        match event {
            ModelStreamEvent::TextDelta(delta) => {
                let id = match &self.text_id {
                    Some(id) => id.clone(),
                    None => {
                        let id = format!("text_{}", Uuid::new_v4().simple());
                        chunks.push(UiMessageChunk::TextStart { id: id.clone() });
                        self.text_id = Some(id.clone());
                        id
                    }
                };
                chunks.push(UiMessageChunk::TextDelta { id, delta });
            }
            ModelStreamEvent::ToolCall(call) => {
                self.close_text(&mut chunks);
                chunks.extend(Self::tool_call(call));
            }
            ModelStreamEvent::Finish => chunks.extend(self.finish()),
        }
        chunks
    }

    /// Chunks closing the message. Idempotent.
    pub fn finish(&mut self) -> Vec<UiMessageChunk> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        let mut chunks = Vec::new();
        self.close_text(&mut chunks);
        chunks.push(UiMessageChunk::FinishStep);
        chunks.push(UiMessageChunk::Finish);
        chunks
    }

    /// The single chunk reporting a mid-stream failure.
    pub fn fail(&mut self, err: &LanguageModelError) -> Vec<UiMessageChunk> {
        self.finished = true;
        vec![UiMessageChunk::Error {
            error_text: err.to_string(),
        }]
    }

    fn close_text(&mut self, chunks: &mut Vec<UiMessageChunk>) {
        if let Some(id) = self.text_id.take() {
            chunks.push(UiMessageChunk::TextEnd { id });
        }
    }

    fn tool_call(call: ToolCall) -> Vec<UiMessageChunk> {
        let ToolCall { id, name, input } = call;
        let mut chunks = vec![
            UiMessageChunk::ToolInputStart {
                tool_call_id: id.clone(),
                tool_name: name.clone(),
            },
            UiMessageChunk::ToolInputDelta {
                tool_call_id: id.clone(),
                input_text_delta: input.to_string(),
            },
        ];
        match validate_tool_input(&name, &input) {
            Ok(()) => chunks.push(UiMessageChunk::ToolInputAvailable {
                tool_call_id: id,
                tool_name: name,
                input,
            }),
            Err(error_text) => {
                warn!(tool_call_id = %id, tool_name = %name, error = %error_text, "invalid tool input");
                chunks.push(UiMessageChunk::ToolInputError {
                    tool_call_id: id,
                    tool_name: name,
                    input,
                    error_text,
                });
            }
        }
        chunks
    }
}

fn validate_tool_input(name: &str, input: &Value) -> Result<(), String> {
    if name != REVERSE_QUESTION_TOOL_NAME {
        return Err(format!("unknown tool: {name}"));
    }
    ReverseQuestionInput::from_value(input.clone())
        .map(|_| ())
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::{ModelMessage, UiPart};
    use crate::domain::ports::MockLanguageModel;
    use rstest::rstest;
    use serde_json::json;

    fn chunk_types(chunks: &[UiMessageChunk]) -> Vec<String> {
        chunks
            .iter()
            .map(|chunk| {
                serde_json::to_value(chunk).expect("chunk json")["type"]
                    .as_str()
                    .expect("type tag")
                    .to_owned()
            })
            .collect()
    }

    fn service_streaming(
        events: Vec<Result<ModelStreamEvent, LanguageModelError>>,
    ) -> AssistantService<MockLanguageModel> {
        let mut model = MockLanguageModel::new();
        model
            .expect_stream()
            .withf(|request| {
                request.system == SYSTEM_PROMPT
                    && request.tools.len() == 1
                    && request.tools[0].name == REVERSE_QUESTION_TOOL_NAME
            })
            .times(1)
            .return_once(move |_| Ok(stream::iter(events).boxed()));
        AssistantService::new(Arc::new(model))
    }

    async fn respond(service: &AssistantService<MockLanguageModel>) -> Vec<UiMessageChunk> {
        service
            .respond(vec![UiMessage::user_text("Recommend a language")])
            .await
            .expect("stream starts")
            .collect()
            .await
    }

    #[rstest]
    #[tokio::test]
    async fn text_is_wrapped_in_start_delta_end() {
        let service = service_streaming(vec![
            Ok(ModelStreamEvent::TextDelta("Hel".to_owned())),
            Ok(ModelStreamEvent::TextDelta("lo".to_owned())),
            Ok(ModelStreamEvent::Finish),
        ]);

        let chunks = respond(&service).await;

        assert_eq!(
            chunk_types(&chunks),
            vec![
                "start",
                "start-step",
                "text-start",
                "text-delta",
                "text-delta",
                "text-end",
                "finish-step",
                "finish"
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn valid_tool_input_becomes_available() {
        let input = json!({ "question": "Pick a language", "type": "text" });
        let service = service_streaming(vec![Ok(ModelStreamEvent::ToolCall(ToolCall {
            id: "c1".to_owned(),
            name: REVERSE_QUESTION_TOOL_NAME.to_owned(),
            input: input.clone(),
        }))]);

        let chunks = respond(&service).await;

        assert!(chunks.contains(&UiMessageChunk::ToolInputAvailable {
            tool_call_id: "c1".to_owned(),
            tool_name: REVERSE_QUESTION_TOOL_NAME.to_owned(),
            input,
        }));
        assert_eq!(chunks.last(), Some(&UiMessageChunk::Finish));
    }

    #[rstest]
    #[case(REVERSE_QUESTION_TOOL_NAME, json!({ "question": "Pick", "type": "radio" }))]
    #[case("weather", json!({ "city": "Tokyo" }))]
    #[tokio::test]
    async fn invalid_tool_input_becomes_input_error(#[case] name: &str, #[case] input: Value) {
        let service = service_streaming(vec![Ok(ModelStreamEvent::ToolCall(ToolCall {
            id: "c1".to_owned(),
            name: name.to_owned(),
            input,
        }))]);

        let chunks = respond(&service).await;

        assert!(
            chunks
                .iter()
                .any(|chunk| matches!(chunk, UiMessageChunk::ToolInputError { .. }))
        );
        assert!(
            !chunks
                .iter()
                .any(|chunk| matches!(chunk, UiMessageChunk::ToolInputAvailable { .. }))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn mid_stream_failure_ends_with_single_error() {
        let service = service_streaming(vec![
            Ok(ModelStreamEvent::TextDelta("Hel".to_owned())),
            Err(LanguageModelError::protocol("bad frame")),
            Ok(ModelStreamEvent::TextDelta("never sent".to_owned())),
        ]);

        let chunks = respond(&service).await;

        assert_eq!(
            chunks.last(),
            Some(&UiMessageChunk::Error {
                error_text: "language model stream was malformed: bad frame".to_owned()
            })
        );
        assert_eq!(
            chunks
                .iter()
                .filter(|chunk| matches!(chunk, UiMessageChunk::Error { .. }))
                .count(),
            1
        );
    }

    #[rstest]
    #[case(LanguageModelError::connection("refused"), true)]
    #[case(LanguageModelError::rejected("quota"), false)]
    #[tokio::test]
    async fn start_failures_are_classified(#[case] failure: LanguageModelError, #[case] unavailable: bool) {
        let mut model = MockLanguageModel::new();
        model.expect_stream().return_once(move |_| Err(failure));
        let service = AssistantService::new(Arc::new(model));

        let Err(err) = service.respond(vec![UiMessage::user_text("Hi")]).await else {
            panic!("stream should not start");
        };
        assert_eq!(
            matches!(err, AssistantChatError::ModelUnavailable { .. }),
            unavailable
        );
    }

    #[rstest]
    #[tokio::test]
    async fn answered_conversation_reaches_the_model_as_tool_results() {
        let mut assistant = UiMessage::assistant("a1");
        assistant.parts = vec![
            UiPart::StepStart,
            serde_json::from_value(json!({
                "type": "tool-reverseQuestion",
                "toolCallId": "c1",
                "state": "output-available",
                "input": { "question": "Pick", "type": "text" },
                "output": { "answer": "Rust", "type": "text", "question": "Pick" }
            }))
            .expect("tool part"),
        ];
        let mut model = MockLanguageModel::new();
        model
            .expect_stream()
            .withf(|request| matches!(request.messages.last(), Some(ModelMessage::Tool { .. })))
            .return_once(|_| Ok(stream::iter(vec![Ok(ModelStreamEvent::Finish)]).boxed()));
        let service = AssistantService::new(Arc::new(model));

        let chunks: Vec<UiMessageChunk> = service
            .respond(vec![UiMessage::user_text("Help"), assistant])
            .await
            .expect("stream")
            .collect()
            .await;

        assert_eq!(
            chunks.first(),
            Some(&UiMessageChunk::Start {
                message_id: Some("a1".to_owned())
            })
        );
    }

    #[rstest]
    fn finish_is_idempotent() {
        let mut encoder = ChunkEncoder::new("m");
        assert_eq!(encoder.finish().len(), 2);
        assert!(encoder.finish().is_empty());
        assert!(encoder.on_event(ModelStreamEvent::Finish).is_empty());
    }
}
