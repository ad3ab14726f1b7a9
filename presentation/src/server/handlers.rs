use super::{AppState, SIGNATURE_HEADERS};
use super::error::ApiError;
use autopilot_application::{Admission, IngestOutcome};
use autopilot_domain::{Task, TaskId, TaskRequest};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
};
use serde_json::{Value, json};

fn signature_header(headers: &HeaderMap) -> Option<&str> {
    SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|v| v.to_str().ok())
}

fn admission_body(admission: &Admission) -> Value {
    json!({
        "id": admission.task.id.as_str(),
        "status": admission.task.status.as_str(),
        "deduplicated": admission.deduplicated,
    })
}

fn status_body(task: &Task) -> Value {
    let mut body = json!({
        "id": task.id.as_str(),
        "status": task.status.as_str(),
        "attempt": task.attempt,
    });
    if let (Some(error), Some(map)) = (&task.error, body.as_object_mut()) {
        map.insert("error".to_string(), json!(error));
    }
    body
}

/// Raw bytes are taken as-is so the signature covers exactly what was sent.
pub(super) async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    match state.ingest.execute(&body, signature_header(&headers)).await? {
        IngestOutcome::Admitted(admission) => Ok(Json(admission_body(&admission))),
        IngestOutcome::Ignored => Ok(Json(json!({ "status": "ignored" }))),
    }
}

pub(super) async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<Value>, ApiError> {
    let admission = state.scheduler.enqueue(request).await?;
    Ok(Json(admission_body(&admission)))
}

pub(super) async fn task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.scheduler.status(&TaskId::new(id.clone())).await? {
        Some(task) => Ok(Json(status_body(&task))),
        None => Err(ApiError::NotFound(id)),
    }
}

pub(super) async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.scheduler.list().await?))
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
