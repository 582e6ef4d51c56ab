//! Greeting read endpoint.
//!
//! ```text
//! GET /api/hello
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::domain::Error;
use crate::domain::Greeting;
use crate::domain::ports::{GreetingRepositoryError, GreetingRepositoryErrorKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, GreetingSchema};
use crate::inbound::http::state::HttpState;

/// Response body for `GET /api/hello`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GreetingResponse {
    #[schema(value_type = GreetingSchema)]
    pub greeting: Greeting,
}

/// Translate a repository failure into the client-facing error.
///
/// Only the message crosses the boundary; the cause stays in the log.
fn map_greeting_error(err: GreetingRepositoryError) -> Error {
    match err.kind() {
        GreetingRepositoryErrorKind::NotFound => {
            warn!(status = 404, error_type = err.kind().as_str(), "greeting not found");
            Error::not_found(err.message())
        }
        GreetingRepositoryErrorKind::Database => {
            error!(
                status = 500,
                error_type = err.kind().as_str(),
                cause = ?err.cause().map(ToString::to_string),
                "greeting lookup failed"
            );
            Error::internal(err.message())
        }
    }
}

/// Return the most recent greeting.
#[utoipa::path(
    get,
    path = "/api/hello",
    responses(
        (status = 200, description = "Latest greeting", body = GreetingResponse),
        (status = 404, description = "No greeting stored", body = ErrorSchema),
        (status = 500, description = "Datastore failure", body = ErrorSchema)
    ),
    tags = ["greetings"],
    operation_id = "getGreeting"
)]
#[get("/api/hello")]
pub async fn get_greeting(state: web::Data<HttpState>) -> ApiResult<web::Json<GreetingResponse>> {
    let greeting = state
        .greetings
        .latest_greeting()
        .await
        .map_err(map_greeting_error)?;
    Ok(web::Json(GreetingResponse { greeting }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GreetingValidationError;
    use crate::domain::ports::{FixtureAssistantChat, MockGreetingQuery};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn call(result: Result<Greeting, GreetingRepositoryError>) -> (StatusCode, Value) {
        let mut query = MockGreetingQuery::new();
        query
            .expect_latest_greeting()
            .times(1)
            .return_once(move || result);
        let state = HttpState::new(Arc::new(query), Arc::new(FixtureAssistantChat));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(get_greeting),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/hello").to_request(),
        )
        .await;
        let status = res.status();
        let body = actix_test::read_body_json(res).await;
        (status, body)
    }

    #[rstest]
    #[actix_web::test]
    async fn ok_returns_the_greeting() {
        let greeting = Greeting::try_new(100, "Newest").expect("valid greeting");

        let (status, body) = call(Ok(greeting)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "greeting": { "id": 100, "message": "Newest" } }));
    }

    #[rstest]
    #[actix_web::test]
    async fn not_found_maps_to_404() {
        let (status, body) = call(Err(GreetingRepositoryError::not_found())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Greeting not found" }));
    }

    #[rstest]
    #[actix_web::test]
    async fn database_error_maps_to_500_without_cause() {
        let err = GreetingRepositoryError::fetch_failed(GreetingValidationError::NonPositiveId {
            id: -1,
        });

        let (status, body) = call(Err(err)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch greeting from database" }));
        assert!(body.get("cause").is_none());
    }
}
