//! HTTP transport for the chat endpoint.
//!
//! [`ChatClient`] posts the whole conversation and yields the UI message
//! stream chunks of the reply, ending at the `[DONE]` frame. It is used by
//! the `assistant-chat` terminal client and by behaviour tests.

use std::fmt::Display;

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::chat::{ChatRequest, UiMessage, UiMessageChunk};
use crate::sse::{DONE, SseBuffer};

/// Path of the chat endpoint relative to the server root.
pub const CHAT_PATH: &str = "/api/chat";

/// Errors raised while talking to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatClientError {
    /// The server could not be reached or the body could not be read.
    #[error("chat transport failed: {message}")]
    Transport { message: String },
    /// The server answered with a non-success status.
    #[error("chat request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    /// A stream frame was not a valid chunk.
    #[error("chat stream was malformed: {message}")]
    Decode { message: String },
}

/// Reply chunks in arrival order.
pub type ChunkStream = BoxStream<'static, Result<UiMessageChunk, ChatClientError>>;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for `POST /api/chat`.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    /// Build a client for the server rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatClientError::Transport`] when the reqwest client cannot
    /// be constructed.
    ///
    /// # Examples
    /// ```
    /// use hello_assistant::client::ChatClient;
    ///
    /// let client = ChatClient::new("http://127.0.0.1:8080/").expect("client");
    /// assert_eq!(client.endpoint(), "http://127.0.0.1:8080/api/chat");
    /// ```
    pub fn new(base_url: &str) -> Result<Self, ChatClientError> {
        let client = Client::builder()
            .build()
            .map_err(|error| ChatClientError::Transport {
                message: error.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// URL the conversation is posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post `messages` and stream the reply.
    ///
    /// # Errors
    ///
    /// Fails before streaming when the server is unreachable or rejects the
    /// request; later failures arrive as `Err` items.
    pub async fn stream(&self, messages: &[UiMessage]) -> Result<ChunkStream, ChatClientError> {
        let request = ChatRequest {
            messages: messages.to_vec(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|error| ChatClientError::Transport {
                message: error.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        Ok(decode_chunks(response.bytes_stream()))
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> ChatClientError {
    let message = serde_json::from_slice::<ErrorBody>(body).map_or_else(
        |_| String::from_utf8_lossy(body).trim().to_owned(),
        |body| body.error,
    );
    ChatClientError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Decode an SSE body into chunks, stopping at `[DONE]` or the first error.
fn decode_chunks<S, E>(source: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = Some((source.boxed(), SseBuffer::new()));
    stream::unfold(state, |state| async move {
        let (mut source, mut buffer) = state?;
        match source.next().await {
            Some(Ok(bytes)) => {
                buffer.push_bytes(&bytes);
                let (batch, ended) = decode_payloads(buffer.extract_data());
                Some((batch, (!ended).then_some((source, buffer))))
            }
            Some(Err(error)) => Some((
                vec![Err(ChatClientError::Transport {
                    message: error.to_string(),
                })],
                None,
            )),
            None => {
                let (batch, _) = decode_payloads(buffer.finish().into_iter().collect());
                Some((batch, None))
            }
        }
    })
    .flat_map(stream::iter)
    .boxed()
}

/// Decode payloads in order; the flag reports that the stream has ended.
fn decode_payloads(
    payloads: Vec<String>,
) -> (Vec<Result<UiMessageChunk, ChatClientError>>, bool) {
    let mut chunks = Vec::new();
    for payload in payloads {
        if payload == DONE {
            return (chunks, true);
        }
        match serde_json::from_str(&payload) {
            Ok(chunk) => chunks.push(Ok(chunk)),
            Err(error) => {
                chunks.push(Err(ChatClientError::Decode {
                    message: error.to_string(),
                }));
                return (chunks, true);
            }
        }
    }
    (chunks, false)
}
