//! HTTP error taxonomy.
//!
//! Every handler error is terminal for the request and is written directly
//! as a plain-text response with a trailing newline; there is no structured
//! error body format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::store::StoreError;

/// Request-level errors surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid access credential.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Malformed or empty input.
    #[error("{0}")]
    BadRequest(&'static str),

    /// Datastore unreachable or a statement failed.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Map a gateway failure to the body reported for a failed insert.
    pub fn from_insert(err: StoreError) -> Self {
        tracing::error!(error = %err, "insert failed");
        match err {
            StoreError::Connect(_) => ApiError::Internal("Unable to connect to db"),
            StoreError::Query(_) => ApiError::Internal("Unable to insert message"),
        }
    }

    /// Map a gateway failure to the body reported for a failed listing.
    pub fn from_list(err: StoreError) -> Self {
        tracing::error!(error = %err, "listing failed");
        match err {
            StoreError::Connect(_) => ApiError::Internal("Unable to connect to db"),
            StoreError::Query(_) => ApiError::Internal("Unable to get messages from db"),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), format!("{self}\n")).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_are_plain_text_with_newline() {
        let response = ApiError::BadRequest("Message is required!").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Message is required!\n");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::Unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::BadRequest("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
