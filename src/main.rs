//! Message board server binary.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ deadline ▶ request-id ▶ trace ▶ access log ▶ router
//!                                                                    │
//!                         ┌──────────┬──────────┬───────────┬────────┘
//!                         ▼          ▼          ▼           ▼
//!                        `/`     `/health`   `/add`    `/messages`
//!                                              │            │
//!                                              ▼            ▼
//!                                          MySQL gateway (pooled)
//! ```
//!
//! Exits 0 after a clean drain; exits non-zero if the listener fails to
//! bind or shutdown overruns the grace period.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use msgboard::config::Config;
use msgboard::http::HttpServer;
use msgboard::lifecycle::{self, Shutdown};
use msgboard::store::MySqlStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "msgboard=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    tracing::info!(port = config.port, "server is starting");

    let listener = match TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(port = config.port, error = %err, "could not bind listener");
            std::process::exit(1);
        }
    };

    let store = Arc::new(MySqlStore::new(config.mysql_dsn.clone()));
    let server = HttpServer::new(&config, store);

    let shutdown = Shutdown::new();
    lifecycle::trigger_on_interrupt(shutdown.clone());

    if let Err(err) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %err, "server terminated abnormally");
        std::process::exit(1);
    }
}
