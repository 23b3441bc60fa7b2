//! In-memory message store.
//!
//! Trait-compatible substitute for the MySQL gateway, used by the test
//! harness and handy for running the server without a database. An optional
//! artificial latency lets tests exercise the request deadline.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::store::{Message, MessageStore, StoreError};

/// Mutex-held vector of messages with an atomic id counter.
#[derive(Default)]
pub struct InMemoryStore {
    messages: Mutex<Vec<Message>>,
    next_id: AtomicI64,
    latency: Option<Duration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation takes at least `latency` to complete.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Snapshot of the stored messages, for test assertions.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn insert(&self, text: &str) -> Result<(), StoreError> {
        self.simulate_latency().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let message = Message {
            id,
            message: text.to_string(),
            created_at: Utc::now(),
        };
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>, StoreError> {
        self.simulate_latency().await;
        Ok(self.snapshot())
    }
}
