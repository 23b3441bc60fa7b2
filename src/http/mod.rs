//! HTTP surface of the message board.
//!
//! # Data Flow
//! ```text
//! inbound connection
//!     → server.rs (router assembly, serve loop, graceful drain)
//!     → middleware.rs (deadline) → request.rs (request id) → access log
//!     → handlers.rs (index / healthz / add_message / list_messages)
//!     → store (message persistence)
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::{TimestampRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServeError};
