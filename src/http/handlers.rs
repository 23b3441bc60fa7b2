//! Route handlers.
//!
//! Response bodies and status codes are part of the service contract:
//! plain-text confirmations and errors, a fixed banner on the root path,
//! and a status-only health probe.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::sync::atomic::Ordering;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::store::Message;

/// Column bound on `messages.message`, enforced here rather than left to
/// MySQL truncation behavior.
const MAX_MESSAGE_CHARS: usize = 500;

const X_CONTENT_TYPE_OPTIONS: HeaderName = HeaderName::from_static("x-content-type-options");

// The banner predates this service and is not valid JSON; clients match on
// it as an opaque string.
const BANNER: &str = "{version: 'v1.0.0', message: 'Hey, I am up and alive!'}\n";

#[derive(Deserialize, Default)]
pub struct AccessParams {
    #[serde(default)]
    access_key: Option<String>,
}

#[derive(Deserialize)]
struct SubmitPayload {
    #[serde(default)]
    message: String,
}

/// `GET /` — fixed version banner.
pub async fn index() -> impl IntoResponse {
    (
        [
            (
                header::CONTENT_TYPE,
                "application/json; charset=utf-8",
            ),
            (X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        BANNER,
    )
}

/// Fallback for unmatched paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found\n")
}

/// `GET /health` — reflects the readiness flag and nothing else.
pub async fn healthz(State(state): State<AppState>) -> StatusCode {
    if state.healthy.load(Ordering::SeqCst) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// `/add` — authenticated message submission.
///
/// Non-POST requests get an informational body with a 200, not an error;
/// clients depend on this permissive behavior.
pub async fn add_message(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<AccessParams>,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return "Only POST method is allowed!\n".into_response();
    }
    match submit(&state, params.access_key.as_deref(), &body).await {
        Ok(text) => format!("{text} is inserted.\n").into_response(),
        Err(err) => err.into_response(),
    }
}

async fn submit(
    state: &AppState,
    access_key: Option<&str>,
    body: &[u8],
) -> Result<String, ApiError> {
    let access_key = access_key
        .filter(|key| !key.is_empty())
        .ok_or(ApiError::Unauthorized(
            "Access key is required to send a message",
        ))?;
    if access_key != state.access_key.as_ref() {
        return Err(ApiError::Unauthorized("Access key is not valid"));
    }

    let payload: SubmitPayload = serde_json::from_slice(body)
        .map_err(|_| ApiError::BadRequest("Unable to read body!"))?;
    if payload.message.is_empty() {
        return Err(ApiError::BadRequest("Message is required!"));
    }
    if payload.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(
            "Message must be at most 500 characters!",
        ));
    }

    state
        .store
        .insert(&payload.message)
        .await
        .map_err(ApiError::from_insert)?;
    Ok(payload.message)
}

/// `GET /messages` — every stored message, in store-returned order.
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.store.list().await.map_err(ApiError::from_list)?;
    Ok(Json(messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_state() -> AppState {
        AppState {
            store: Arc::new(InMemoryStore::new()),
            access_key: Arc::from("sekrit"),
            request_timeout: Duration::from_secs(5),
            healthy: Arc::new(AtomicBool::new(false)),
        }
    }

    #[tokio::test]
    async fn healthz_follows_the_flag() {
        let state = test_state();
        assert_eq!(
            healthz(State(state.clone())).await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        state.healthy.store(true, Ordering::SeqCst);
        assert_eq!(healthz(State(state)).await, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn submit_rejects_missing_key() {
        let state = test_state();
        let err = submit(&state, None, br#"{"message":"hi"}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert!(state.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_rejects_wrong_key() {
        let state = test_state();
        let err = submit(&state, Some("nope"), br#"{"message":"hi"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn submit_rejects_empty_message() {
        let state = test_state();
        let err = submit(&state, Some("sekrit"), br#"{"message":""}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(state.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_rejects_oversized_message() {
        let state = test_state();
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        let body = format!(r#"{{"message":"{long}"}}"#);
        let err = submit(&state, Some("sekrit"), body.as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn submit_persists_valid_message() {
        let state = test_state();
        let text = submit(&state, Some("sekrit"), br#"{"message":"hello"}"#)
            .await
            .unwrap();
        assert_eq!(text, "hello");

        let messages = state.store.list().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "hello");
    }
}
