//! MySQL-backed message store.
//!
//! # Responsibilities
//! - Open a bounded connection pool on first use and reuse it thereafter
//! - Create the `messages` table at most once per process lifetime
//! - Run parameterized insert/select statements
//!
//! # Design Decisions
//! - The pool is created lazily so a store that is down at boot yields
//!   per-request errors and a later recovery is picked up without a restart
//! - Schema creation is best-effort: an operator has usually provisioned the
//!   table already, so failures are logged at warn level and swallowed
//! - Statements bind parameters, never concatenate user input into SQL

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tokio::sync::OnceCell;

use crate::store::{Message, MessageStore, StoreError};

/// Upper bound on open connections; the pool is the sole backpressure
/// mechanism for datastore load.
const MAX_OPEN_CONNECTIONS: u32 = 10;

/// Connections are recycled after this long regardless of use.
const CONNECTION_MAX_LIFETIME: Duration = Duration::from_secs(3 * 60);

const CREATE_TABLE_SQL: &str = "CREATE TABLE messages(\
     id INT NOT NULL AUTO_INCREMENT, \
     message VARCHAR(500) NOT NULL, \
     timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP, \
     PRIMARY KEY (id))";

const INSERT_SQL: &str = "INSERT INTO messages(message) VALUES(?)";

// No ORDER BY: listing order is whatever the datastore returns.
const LIST_SQL: &str = "SELECT id, message, timestamp AS created_at FROM messages";

/// Pooled sqlx gateway to the `messages` table.
pub struct MySqlStore {
    dsn: String,
    pool: OnceCell<MySqlPool>,
    schema_guard: OnceCell<()>,
    #[cfg(test)]
    schema_attempts: std::sync::atomic::AtomicU32,
}

impl MySqlStore {
    /// Create a store for the given connection string. No I/O happens here;
    /// the pool is dialed on first use.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            pool: OnceCell::new(),
            schema_guard: OnceCell::new(),
            #[cfg(test)]
            schema_attempts: std::sync::atomic::AtomicU32::new(0),
        }
    }

    /// Get the shared pool, dialing and pinging the store on first call.
    ///
    /// A failed attempt leaves the cell empty, so the next request retries.
    async fn pool(&self) -> Result<&MySqlPool, StoreError> {
        self.pool
            .get_or_try_init(|| async {
                MySqlPoolOptions::new()
                    .max_connections(MAX_OPEN_CONNECTIONS)
                    .max_lifetime(CONNECTION_MAX_LIFETIME)
                    .connect(&self.dsn)
                    .await
                    .map_err(StoreError::Connect)
            })
            .await
    }

    /// Run the table-creation statement at most once per process lifetime.
    ///
    /// Concurrent first callers are synchronized by the cell; the statement
    /// never runs a second time regardless of the first outcome.
    async fn ensure_schema(&self, pool: &MySqlPool) {
        self.schema_guard
            .get_or_init(|| async {
                #[cfg(test)]
                self.schema_attempts
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if let Err(err) = sqlx::query(CREATE_TABLE_SQL).execute(pool).await {
                    tracing::warn!(
                        error = %err,
                        "could not create messages table, assuming it exists"
                    );
                }
            })
            .await;
    }
}

#[async_trait]
impl MessageStore for MySqlStore {
    async fn insert(&self, text: &str) -> Result<(), StoreError> {
        let pool = self.pool().await?;
        self.ensure_schema(pool).await;

        sqlx::query(INSERT_SQL)
            .bind(text)
            .execute(pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        let pool = self.pool().await?;
        self.ensure_schema(pool).await;

        sqlx::query_as::<_, Message>(LIST_SQL)
            .fetch_all(pool)
            .await
            .map_err(StoreError::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_store_reports_connect_error() {
        let store = MySqlStore::new("mysql://nobody@127.0.0.1:1/none");
        match store.insert("hello").await {
            Err(StoreError::Connect(_)) => {}
            other => panic!("expected connect error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn schema_statement_runs_once_across_racing_first_callers() {
        let dsn = "mysql://nobody@127.0.0.1:1/none";
        let store = MySqlStore::new(dsn);
        let pool = MySqlPoolOptions::new().connect_lazy(dsn).unwrap();

        tokio::join!(
            store.ensure_schema(&pool),
            store.ensure_schema(&pool),
            store.ensure_schema(&pool),
            store.ensure_schema(&pool),
        );
        // A later caller is a no-op regardless of the first outcome.
        store.ensure_schema(&pool).await;

        assert_eq!(
            store
                .schema_attempts
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[test]
    fn statements_are_parameterized() {
        assert!(INSERT_SQL.contains('?'));
        assert!(!LIST_SQL.to_ascii_lowercase().contains("order by"));
    }
}
