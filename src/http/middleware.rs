//! Cross-cutting request middleware.
//!
//! # Responsibilities
//! - Enforce the per-request deadline on the whole pipeline
//! - Write one access-log line per request, success or failure
//!
//! # Design Decisions
//! - The deadline aborts the response, not the work: a datastore call
//!   already submitted on a pooled connection runs to completion server-side
//! - The access log runs after the handler returns; handlers always produce
//!   a response, so the line is emitted for error responses too

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;

use crate::http::request::X_REQUEST_ID;
use crate::http::server::AppState;

/// Body sent when a request exceeds its deadline.
pub const TIMEOUT_MESSAGE: &str =
    "Timeout! Server is taking unexpected amount of time to respond.";

/// Outermost stage: bound the total time spent on a request.
pub async fn enforce_deadline(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(state.request_timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("request exceeded deadline");
            (StatusCode::SERVICE_UNAVAILABLE, TIMEOUT_MESSAGE).into_response()
        }
    }
}

/// Innermost stage before the router: record who asked for what.
pub async fn access_log(request: Request<Body>, next: Next) -> Response {
    let request_id = header_str(&request, &X_REQUEST_ID);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = header_str(&request, &header::USER_AGENT);

    let response = next.run(request).await;

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        user_agent = %user_agent,
        status = response.status().as_u16(),
        "request handled"
    );

    response
}

fn header_str(request: &Request<Body>, name: &header::HeaderName) -> String {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
