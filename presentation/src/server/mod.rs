//! HTTP surface: webhook intake and task queries.
//!
//! ```text
//!   POST /webhook      raw body + signature header -> ingest use case
//!   POST /tasks        direct admission (trusted callers)
//!   GET  /tasks        all task snapshots
//!   GET  /tasks/{id}   { id, status, attempt, error? }
//!   GET  /health
//! ```

mod error;
mod handlers;

pub use error::ApiError;

use autopilot_application::{IngestWebhookUseCase, SchedulerHandle};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Signature headers, in lookup order
pub const SIGNATURE_HEADERS: [&str; 3] = ["x-webhook-signature", "linear-signature", "x-signature"];

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestWebhookUseCase>,
    pub scheduler: SchedulerHandle,
}

impl AppState {
    pub fn new(ingest: Arc<IngestWebhookUseCase>, scheduler: SchedulerHandle) -> Self {
        Self { ingest, scheduler }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::webhook))
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/{id}", get(handlers::task_status))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Serve until `cancel` fires; in-flight requests are allowed to finish.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}
