//! Driving port used by inbound adapters to stream an assistant reply.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};

use super::define_port_error;
use crate::domain::chat::{UiMessage, UiMessageChunk};

define_port_error! {
    /// Failures that prevent a reply stream from starting.
    pub enum AssistantChatError {
        /// The language model cannot be reached.
        ModelUnavailable { message: String } => "language model unavailable: {message}",
        /// The language model failed for another reason.
        ModelFailed { message: String } => "language model request failed: {message}",
    }
}

/// UI message stream chunks in emission order.
pub type UiChunkStream = BoxStream<'static, UiMessageChunk>;

/// Use-case port for the chat endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantChat: Send + Sync {
    /// Stream the assistant's reply to the conversation `messages`.
    async fn respond(&self, messages: Vec<UiMessage>) -> Result<UiChunkStream, AssistantChatError>;
}

/// Fixture chat that replies with one fixed sentence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssistantChat;

#[async_trait]
impl AssistantChat for FixtureAssistantChat {
    async fn respond(&self, _messages: Vec<UiMessage>) -> Result<UiChunkStream, AssistantChatError> {
        let id = "fixture-text".to_owned();
        Ok(stream::iter(vec![
            UiMessageChunk::Start { message_id: None },
            UiMessageChunk::StartStep,
            UiMessageChunk::TextStart { id: id.clone() },
            UiMessageChunk::TextDelta {
                id: id.clone(),
                delta: "Hello from the fixture assistant.".to_owned(),
            },
            UiMessageChunk::TextEnd { id },
            UiMessageChunk::FinishStep,
            UiMessageChunk::Finish,
        ])
        .boxed())
    }
}
