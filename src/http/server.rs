//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (deadline, request ID, tracing, access log)
//! - Serve connections and coordinate graceful shutdown
//!
//! # Lifecycle
//! ```text
//! starting: routes registered, listener not yet serving
//! ready:    accepting connections, healthy flag = true
//! draining: interrupt received, healthy flag = false, keep-alive off,
//!           in-flight requests get a bounded grace period
//! stopped:  drained cleanly, or the grace period elapsed (fatal)
//! ```

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::http::handlers;
use crate::http::middleware::{access_log, enforce_deadline};
use crate::http::request::{TimestampRequestId, X_REQUEST_ID};
use crate::store::MessageStore;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    pub access_key: Arc<str>,
    pub request_timeout: Duration,
    /// Readiness flag; the only externally observable view of the lifecycle.
    pub healthy: Arc<AtomicBool>,
}

/// Errors that terminate the serve loop.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not gracefully shut down within the grace period")]
    GracePeriodExceeded,
}

/// HTTP server for the message board.
pub struct HttpServer {
    router: Router,
    state: AppState,
    grace_period: Duration,
}

impl HttpServer {
    /// Register routes and middleware. The listener is bound by the caller
    /// so tests can use an ephemeral port.
    pub fn new(config: &Config, store: Arc<dyn MessageStore>) -> Self {
        let state = AppState {
            store,
            access_key: Arc::from(config.access_key.as_str()),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            healthy: Arc::new(AtomicBool::new(false)),
        };

        let router = Self::build_router(state.clone());
        Self {
            router,
            state,
            grace_period: Duration::from_secs(config.shutdown_grace_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost to innermost: deadline, request-id set/propagate, trace,
    /// access log, router.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/health", get(handlers::healthz))
            .route("/add", any(handlers::add_message))
            .route("/messages", get(handlers::list_messages))
            .fallback(handlers::not_found)
            .with_state(state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn_with_state(state, enforce_deadline))
                    .layer(SetRequestIdLayer::new(
                        X_REQUEST_ID,
                        TimestampRequestId::default(),
                    ))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn(access_log)),
            )
    }

    /// Serve until the shutdown signal fires, then drain within the grace
    /// period. Overrunning the grace period is fatal; there is no partial
    /// drain retry.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        let healthy = self.state.healthy.clone();

        let mut drain_rx = shutdown;
        // Armed by the drain future itself, so the grace timer never misses
        // a signal that was queued before this call.
        let (grace_tx, grace_rx) = oneshot::channel();

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.recv().await;
                // Flag goes down first so load balancers stop routing while
                // in-flight requests drain.
                healthy.store(false, Ordering::SeqCst);
                let _ = grace_tx.send(());
                tracing::info!("server is shutting down");
            })
            .into_future();

        tracing::info!(address = %addr, "server is ready to handle requests");
        self.state.healthy.store(true, Ordering::SeqCst);

        let grace_period = self.grace_period;
        tokio::select! {
            result = server => {
                result?;
                tracing::info!("server stopped");
                Ok(())
            }
            _ = async {
                let _ = grace_rx.await;
                tokio::time::sleep(grace_period).await;
            } => Err(ServeError::GracePeriodExceeded),
        }
    }
}
