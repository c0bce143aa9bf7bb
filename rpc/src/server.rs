//! Axum-based RPC server.

use axum::routing::{get, post};
use axum::Router;
use regdesk_desk::{DeskConfig, EventDesk, ShutdownSignal};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<EventDesk>,
    /// Actor recorded on payment reviews that do not name one.
    pub default_performed_by: Arc<str>,
}

impl AppState {
    pub fn new(desk: Arc<EventDesk>, default_performed_by: impl Into<Arc<str>>) -> Self {
        Self {
            desk,
            default_performed_by: default_performed_by.into(),
        }
    }
}

/// Build the full route table.
pub fn router(state: AppState, enable_metrics: bool, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/events/:id",
            get(handlers::get_event).put(handlers::open_event),
        )
        .route("/events/:id/register", post(handlers::register))
        .route("/events/:id/registrations", get(handlers::list_registrations))
        .route("/events/:id/waitlist", get(handlers::list_waitlist))
        .route(
            "/events/:id/registrations/:idx/payment-proof",
            post(handlers::submit_payment_proof),
        )
        .route(
            "/events/:id/registrations/:idx/cancel",
            post(handlers::cancel_registration),
        )
        .route("/events/:id/promote", post(handlers::promote))
        .route("/events/:id/pending-payments", get(handlers::pending_payments))
        .route("/events/:id/payment-logs", get(handlers::payment_logs))
        .route(
            "/events/:id/verify-payment/:idx",
            post(handlers::verify_payment),
        )
        .route("/events/:id/remind", post(handlers::remind));

    if enable_metrics {
        app = app.route("/metrics", get(handlers::metrics));
    }

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);
    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

pub struct RpcServer {
    pub bind_addr: String,
    pub enable_metrics: bool,
    pub enable_cors: bool,
    pub state: AppState,
}

impl RpcServer {
    pub fn new(config: &DeskConfig, desk: Arc<EventDesk>) -> Self {
        Self {
            bind_addr: config.bind_addr(),
            enable_metrics: config.enable_metrics,
            enable_cors: config.enable_cors,
            state: AppState::new(desk, config.default_performed_by.as_str()),
        }
    }

    /// Serve until `shutdown` fires.
    pub async fn start(&self, shutdown: ShutdownSignal) -> Result<(), RpcError> {
        let app = router(self.state.clone(), self.enable_metrics, self.enable_cors);

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {}: {e}", self.bind_addr)))?;
        info!(
            addr = %self.bind_addr,
            metrics = self.enable_metrics,
            "RPC server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("RPC server stopped");
        Ok(())
    }
}
