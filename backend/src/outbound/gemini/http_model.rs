//! Reqwest-backed Gemini language model adapter.
//!
//! This adapter owns transport details only: request serialisation, HTTP
//! error mapping, and incremental decoding of the SSE response body into
//! model events.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::config::AssistantSettings;
use super::dto::{GenerateRequestDto, GenerateResponseDto};
use crate::domain::chat::{ModelRequest, ModelStreamEvent};
use crate::domain::ports::{LanguageModel, LanguageModelError, ModelEventStream};
use crate::sse::SseBuffer;

const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Language model adapter streaming completions from the Gemini API.
pub struct GeminiLanguageModel {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiLanguageModel {
    /// Build an adapter for `model` under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: stream_endpoint(base_url, model),
            api_key: api_key.into(),
        })
    }

    /// Build an adapter from settings, or `None` when no API key is set.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn from_settings(settings: &AssistantSettings) -> Result<Option<Self>, reqwest::Error> {
        settings
            .api_key()
            .map(|key| Self::new(settings.base_url(), settings.model(), key))
            .transpose()
    }
}

#[async_trait]
impl LanguageModel for GeminiLanguageModel {
    async fn stream(&self, request: ModelRequest) -> Result<ModelEventStream, LanguageModelError> {
        let body = GenerateRequestDto::from_request(&request);
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|error| LanguageModelError::connection(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(%status, "language model stream opened");
        Ok(decode_events(response.bytes_stream()))
    }
}

fn stream_endpoint(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{model}:streamGenerateContent?alt=sse",
        base_url.trim_end_matches('/')
    )
}

/// Decode an SSE body into model events.
///
/// The stream ends with [`ModelStreamEvent::Finish`] when the body completes,
/// or with a single error when the body or a frame cannot be read.
fn decode_events<S, E>(source: S) -> ModelEventStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = Some((source.boxed(), SseBuffer::new()));
    stream::unfold(state, |state| async move {
        let (mut source, mut buffer) = state?;
        match source.next().await {
            Some(Ok(chunk)) => {
                buffer.push_bytes(&chunk);
                let batch = decode_payloads(buffer.extract_data());
                let failed = batch.iter().any(Result::is_err);
                Some((batch, (!failed).then_some((source, buffer))))
            }
            Some(Err(error)) => Some((
                vec![Err(LanguageModelError::connection(error.to_string()))],
                None,
            )),
            None => {
                let mut batch = decode_payloads(buffer.finish().into_iter().collect());
                if !batch.iter().any(Result::is_err) {
                    batch.push(Ok(ModelStreamEvent::Finish));
                }
                Some((batch, None))
            }
        }
    })
    .flat_map(stream::iter)
    .boxed()
}

/// Decode frames in order, stopping after the first malformed one.
fn decode_payloads(payloads: Vec<String>) -> Vec<Result<ModelStreamEvent, LanguageModelError>> {
    let mut events = Vec::new();
    for payload in payloads {
        match decode_frame(&payload) {
            Ok(decoded) => events.extend(decoded.into_iter().map(Ok)),
            Err(error) => {
                events.push(Err(error));
                break;
            }
        }
    }
    events
}

fn decode_frame(payload: &str) -> Result<Vec<ModelStreamEvent>, LanguageModelError> {
    let frame: GenerateResponseDto = serde_json::from_str(payload)
        .map_err(|error| LanguageModelError::protocol(format!("invalid frame: {error}")))?;
    frame.into_events().map_err(LanguageModelError::protocol)
}

fn map_status_error(status: StatusCode, body: &[u8]) -> LanguageModelError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => LanguageModelError::connection(message),
        _ => LanguageModelError::rejected(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
