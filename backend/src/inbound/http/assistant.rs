//! Chat endpoint streaming the assistant reply as a UI message stream.
//!
//! ```text
//! POST /api/assistant {"messages":[...]}
//! POST /api/chat      (alias)
//! ```
//!
//! The response is `text/event-stream`: one `data:` frame per
//! [`UiMessageChunk`], then `data: [DONE]`.

use std::convert::Infallible;

use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::{HttpResponse, Resource, web};
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, error};

use crate::domain::Error;
use crate::domain::chat::{ChatRequest, UiMessageChunk};
use crate::domain::ports::AssistantChatError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ChatRequestSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::sse;

/// Paths served by [`chat`].
pub const CHAT_PATHS: [&str; 2] = ["/api/assistant", "/api/chat"];

/// Header announcing the UI message stream protocol version.
pub const UI_MESSAGE_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";

fn map_chat_error(err: AssistantChatError) -> Error {
    error!(error = %err, "assistant reply could not start");
    match err {
        AssistantChatError::ModelUnavailable { .. } => {
            Error::service_unavailable("Language model unavailable")
        }
        AssistantChatError::ModelFailed { .. } => Error::internal("Language model request failed"),
    }
}

fn encode_chunk(chunk: &UiMessageChunk) -> Bytes {
    let json = serde_json::to_string(chunk).unwrap_or_else(|err| {
        error!(error = %err, "failed to encode stream chunk");
        r#"{"type":"error","errorText":"failed to encode stream chunk"}"#.to_owned()
    });
    Bytes::from(sse::frame(&json))
}

/// Stream the assistant's reply to the posted conversation.
#[utoipa::path(
    post,
    path = "/api/assistant",
    request_body = ChatRequestSchema,
    responses(
        (
            status = 200,
            description = "UI message stream",
            content_type = "text/event-stream",
            body = String
        ),
        (status = 400, description = "Malformed chat request", body = ErrorSchema),
        (status = 500, description = "Language model request failed", body = ErrorSchema),
        (status = 503, description = "Language model unavailable", body = ErrorSchema)
    ),
    tags = ["assistant"],
    operation_id = "chat"
)]
pub async fn chat(state: web::Data<HttpState>, body: Bytes) -> ApiResult<HttpResponse> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|err| Error::invalid_request(format!("invalid chat request: {err}")))?;
    debug!(messages = request.messages.len(), "chat request received");

    let chunks = state
        .assistant
        .respond(request.messages)
        .await
        .map_err(map_chat_error)?;
    let frames = chunks
        .map(|chunk| encode_chunk(&chunk))
        .chain(stream::once(async { Bytes::from(sse::frame(sse::DONE)) }))
        .map(Ok::<_, Infallible>);

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header((
            HeaderName::from_static(UI_MESSAGE_STREAM_HEADER),
            HeaderValue::from_static("v1"),
        ))
        .streaming(frames))
}

/// Resource registering [`chat`] on every path in [`CHAT_PATHS`].
pub fn chat_resource() -> Resource {
    web::resource(CHAT_PATHS).route(web::post().to(chat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FixtureAssistantChat, FixtureGreetingQuery, MockAssistantChat,
    };
    use crate::domain::chat::UiMessage;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn post(state: HttpState, uri: &str, body: Value) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(chat_resource()),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri(uri)
            .set_json(body)
            .to_request();
        actix_test::call_service(&app, req).await
    }

    fn data_frames(body: &[u8]) -> Vec<String> {
        let mut buffer = sse::SseBuffer::new();
        buffer.push_bytes(&Bytes::copy_from_slice(body));
        buffer.extract_data()
    }

    #[rstest]
    #[case("/api/assistant")]
    #[case("/api/chat")]
    #[actix_web::test]
    async fn streams_frames_then_done(#[case] uri: &str) {
        let res = post(
            HttpState::fixtures(),
            uri,
            json!({ "messages": [UiMessage::user_text("Hi")] }),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).map(HeaderValue::as_bytes),
            Some(&b"text/event-stream"[..])
        );
        assert_eq!(
            res.headers().get(UI_MESSAGE_STREAM_HEADER).map(HeaderValue::as_bytes),
            Some(&b"v1"[..])
        );
        let body = actix_test::read_body(res).await;
        let frames = data_frames(&body);
        assert_eq!(frames.last().map(String::as_str), Some(sse::DONE));
        let first: Value = serde_json::from_str(&frames[0]).expect("chunk json");
        assert_eq!(first["type"], "start");
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_body_is_rejected() {
        let res = post(HttpState::fixtures(), "/api/chat", json!({ "messages": 3 })).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert!(body["error"].as_str().is_some());
    }

    #[rstest]
    #[case(AssistantChatError::model_unavailable("refused"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(AssistantChatError::model_failed("quota"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[actix_web::test]
    async fn start_failures_map_to_status(
        #[case] failure: AssistantChatError,
        #[case] expected: StatusCode,
    ) {
        let mut assistant = MockAssistantChat::new();
        assistant
            .expect_respond()
            .times(1)
            .return_once(move |_| Err(failure));
        let state = HttpState::new(Arc::new(FixtureGreetingQuery), Arc::new(assistant));

        let res = post(state, "/api/assistant", json!({ "messages": [] })).await;

        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn fixture_chat_text_is_relayed() {
        let res = post(
            HttpState::new(Arc::new(FixtureGreetingQuery), Arc::new(FixtureAssistantChat)),
            "/api/chat",
            json!({ "messages": [] }),
        )
        .await;
        let body = actix_test::read_body(res).await;
        let text: String = data_frames(&body)
            .iter()
            .filter_map(|frame| serde_json::from_str::<UiMessageChunk>(frame).ok())
            .filter_map(|chunk| match chunk {
                UiMessageChunk::TextDelta { delta, .. } => Some(delta),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Hello from the fixture assistant.");
    }
}
