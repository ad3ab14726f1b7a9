//! Mapping from use-case errors to HTTP responses

use autopilot_application::{IngestError, SchedulerError};
use autopilot_domain::WebhookError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Ingest(IngestError),
    Scheduler(SchedulerError),
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ingest(IngestError::Webhook(e)) => webhook_status(e),
            ApiError::Ingest(IngestError::Scheduler(e)) | ApiError::Scheduler(e) => {
                scheduler_status(e)
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Ingest(e) => e.to_string(),
            ApiError::Scheduler(e) => e.to_string(),
            ApiError::NotFound(id) => format!("Task not found: {}", id),
        }
    }
}

fn webhook_status(error: &WebhookError) -> StatusCode {
    match error {
        WebhookError::SignatureInvalid => StatusCode::UNAUTHORIZED,
        WebhookError::MalformedPayload(_)
        | WebhookError::TimestampStale
        | WebhookError::ReplayDetected => StatusCode::BAD_REQUEST,
    }
}

fn scheduler_status(error: &SchedulerError) -> StatusCode {
    match error {
        SchedulerError::QueueFull | SchedulerError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        SchedulerError::InvalidTask(_) => StatusCode::BAD_REQUEST,
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        ApiError::Ingest(e)
    }
}

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        ApiError::Scheduler(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
