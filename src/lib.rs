//! Minimal HTTP message board.
//!
//! Accepts short text messages via an authenticated POST endpoint, persists
//! them to a single MySQL table, and lists them back. Also serves a version
//! banner and a health probe, and drains gracefully on interrupt.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod store;

pub use config::Config;
pub use http::{HttpServer, ServeError};
pub use lifecycle::Shutdown;
pub use store::{InMemoryStore, Message, MessageStore, MySqlStore, StoreError};
