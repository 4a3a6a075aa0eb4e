//! Task API endpoints
//!
//! Thin HTTP layer over [`TaskHandler`]: request bodies are passed through as
//! JSON text and handler output is returned verbatim.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use todo_core::Error;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

type ApiResult = Result<Response, (StatusCode, Json<ErrorResponse>)>;

fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::Validation(_) | Error::Decode(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::AlreadyExists(_) => StatusCode::CONFLICT,
        Error::Cancelled | Error::DeadlineExceeded => StatusCode::SERVICE_UNAVAILABLE,
        Error::Storage(_) | Error::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Task request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Path ordinals arrive as text so parse failures share the JSON error body
fn parse_ordinal(raw: &str, what: &str) -> Result<i64, (StatusCode, Json<ErrorResponse>)> {
    raw.trim().parse().map_err(|_| {
        error_response(Error::Validation(format!("invalid {} value: {}", what, raw)))
    })
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/tasks - Create a new task
async fn create_task(State(state): State<AppState>, body: String) -> ApiResult {
    let ctx = state.request_context();
    let task = state
        .handler()
        .create_task(&ctx, &body)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::CREATED, task))
}

/// GET /api/tasks - List all tasks, newest first
async fn list_tasks(State(state): State<AppState>) -> ApiResult {
    let ctx = state.request_context();
    let tasks = state
        .handler()
        .get_tasks(&ctx, "")
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, tasks))
}

/// POST /api/tasks/search - List tasks matching a filter body
async fn search_tasks(State(state): State<AppState>, body: String) -> ApiResult {
    let ctx = state.request_context();
    let tasks = state
        .handler()
        .get_tasks(&ctx, &body)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, tasks))
}

/// PUT /api/tasks - Replace a task's mutable fields
async fn update_task(State(state): State<AppState>, body: String) -> ApiResult {
    let ctx = state.request_context();
    let task = state
        .handler()
        .update_task(&ctx, &body)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, task))
}

/// GET /api/tasks/{id} - Get a single task
async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let ctx = state.request_context();
    let task = state
        .handler()
        .get_task(&ctx, &id)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, task))
}

/// DELETE /api/tasks/{id} - Delete a task
async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let ctx = state.request_context();
    state
        .handler()
        .delete_task(&ctx, &id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /api/tasks/{id}/toggle - Flip between active and completed
async fn toggle_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let ctx = state.request_context();
    let task = state
        .handler()
        .toggle_task_status(&ctx, &id)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, task))
}

/// GET /api/tasks/status/{status}
async fn tasks_by_status(State(state): State<AppState>, Path(status): Path<String>) -> ApiResult {
    let status = parse_ordinal(&status, "status")?;
    let ctx = state.request_context();
    let tasks = state
        .handler()
        .get_tasks_by_status(&ctx, status)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, tasks))
}

/// GET /api/tasks/priority/{priority}
async fn tasks_by_priority(State(state): State<AppState>, Path(priority): Path<String>) -> ApiResult {
    let priority = parse_ordinal(&priority, "priority")?;
    let ctx = state.request_context();
    let tasks = state
        .handler()
        .get_tasks_by_priority(&ctx, priority)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, tasks))
}

/// GET /api/tasks/range?from=..&to=..
async fn tasks_in_range(State(state): State<AppState>, Query(range): Query<RangeQuery>) -> ApiResult {
    let ctx = state.request_context();
    let tasks = state
        .handler()
        .get_tasks_by_date_range(&ctx, &range.from, &range.to)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, tasks))
}

/// GET /api/tasks/overdue
async fn overdue_tasks(State(state): State<AppState>) -> ApiResult {
    let ctx = state.request_context();
    let tasks = state
        .handler()
        .get_overdue_tasks(&ctx)
        .await
        .map_err(error_response)?;
    Ok(json_response(StatusCode::OK, tasks))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/tasks",
            get(list_tasks).post(create_task).put(update_task),
        )
        .route("/api/tasks/search", post(search_tasks))
        .route("/api/tasks/overdue", get(overdue_tasks))
        .route("/api/tasks/range", get(tasks_in_range))
        .route("/api/tasks/status/{status}", get(tasks_by_status))
        .route("/api/tasks/priority/{priority}", get(tasks_by_priority))
        .route("/api/tasks/{id}", get(get_task).delete(delete_task))
        .route("/api/tasks/{id}/toggle", post(toggle_task))
}
