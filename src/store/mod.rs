//! Datastore gateway.
//!
//! # Responsibilities
//! - Define the `Message` record persisted in the `messages` table
//! - Abstract reads/writes behind the `MessageStore` trait
//! - Surface connection failures separately from query failures
//!
//! # Data Flow
//! ```text
//! handler
//!     → MessageStore::insert / MessageStore::list
//!     → mysql.rs (pooled sqlx gateway, production)
//!       memory.rs (in-process store, tests and local development)
//! ```

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

/// A persisted message row.
///
/// Messages are immutable once written; there is no update or delete path
/// anywhere in the crate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    /// Datastore-assigned surrogate id, unique and monotonically increasing.
    pub id: i64,
    /// Message text, non-empty, at most 500 characters.
    pub message: String,
    /// Assigned by the datastore at insertion time.
    pub created_at: DateTime<Utc>,
}

/// Errors from the datastore gateway.
///
/// Connection and query failures are distinct variants because the HTTP
/// surface reports them with different bodies.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store was unreachable or the connection string was rejected.
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    /// A prepare, execute, or row-decode step failed.
    #[error("database query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Mediates all reads and writes to the message table.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one message. The store assigns `id` and `created_at`.
    async fn insert(&self, text: &str) -> Result<(), StoreError>;

    /// Return every stored message in storage order.
    async fn list(&self) -> Result<Vec<Message>, StoreError>;
}
