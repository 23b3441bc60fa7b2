//! Shared harness for integration tests.
//!
//! Spawns the real server in-process on an ephemeral port, backed by the
//! in-memory store, and polls the health endpoint until it is serving.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use msgboard::config::Config;
use msgboard::http::{HttpServer, ServeError};
use msgboard::lifecycle::Shutdown;
use msgboard::store::InMemoryStore;

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<InMemoryStore>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ServeError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Spawn a server with the default store and access key `sekrit`.
pub async fn spawn_server() -> TestServer {
    spawn_server_with(Arc::new(InMemoryStore::new()), 5, 30).await
}

/// Spawn a server with a caller-supplied store, request timeout, and
/// shutdown grace period.
pub async fn spawn_server_with(
    store: Arc<InMemoryStore>,
    request_timeout_secs: u64,
    shutdown_grace_secs: u64,
) -> TestServer {
    let config = Config::parse_from([
        "msgboard",
        "--access-key",
        "sekrit",
        "--request-timeout-secs",
        &request_timeout_secs.to_string(),
        "--shutdown-grace-secs",
        &shutdown_grace_secs.to_string(),
    ]);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&config, store.clone());
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let server = TestServer {
        addr,
        store,
        shutdown,
        handle,
    };
    wait_until_healthy(&server).await;
    server
}

async fn wait_until_healthy(server: &TestServer) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(response) = client.get(server.url("/health")).send().await {
            if response.status() == 204 {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not become healthy");
}
