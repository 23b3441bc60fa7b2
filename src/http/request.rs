//! Request identifiers.
//!
//! # Responsibilities
//! - Honor an inbound `x-request-id` header when the client supplies one
//! - Otherwise generate an id unique within the process
//! - Echo the id on every response (wired up in server.rs)
//!
//! # Design Decisions
//! - Ids are a high-resolution timestamp plus a process-local counter; the
//!   counter guarantees uniqueness when two requests land in the same nanos

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates `<unix-nanos>-<sequence>` request ids.
#[derive(Clone, Default)]
pub struct TimestampRequestId {
    counter: Arc<AtomicU64>,
}

impl MakeRequestId for TimestampRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        HeaderValue::from_str(&format!("{nanos}-{sequence}"))
            .ok()
            .map(RequestId::new)
    }
}
