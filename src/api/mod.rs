use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::middleware;
use axum::routing::patch;
use axum::http::{HeaderMap, header::CONTENT_TYPE};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{AuthUser, require_auth};
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let tasks = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            patch(update_task).put(update_task).delete(delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .merge(tasks)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.ping().await?;
    Ok(StatusCode::OK)
}

async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let new_task = CreateTaskRequest::from_body(content_type, &body)?.into_new_task(&user.user_id)?;
    let task = state.store.create(new_task).await?;
    info!("task {} created by {}", task.id, task.created_by);
    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

async fn list_tasks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TaskListResponse>, AppError> {
    let tasks = state.store.find_by_owner(&user.user_id).await?;
    Ok(Json(TaskListResponse::from(tasks)))
}

async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, AppError> {
    let changes = json_body(payload)?.into_changes()?;
    let task = state
        .store
        .update(&id, &user.user_id, changes)
        .await?
        .ok_or_else(|| AppError::task_not_found(&id))?;
    Ok(Json(TaskResponse { task }))
}

async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .store
        .delete(&id, &user.user_id)
        .await?
        .ok_or_else(|| AppError::task_not_found(&id))?;
    info!("task {} deleted by {}", id, user.user_id);
    Ok(StatusCode::OK)
}
