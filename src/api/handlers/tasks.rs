//! Task handlers for the caller's own tasks.

use crate::{
    AppState,
    auth::{middleware::AuthUser, ownership::ensure_owner},
    db::{NewTask, Task},
    types::{
        AppError, CreateTaskRequest, MessageResponse, Result, TaskResponse, UpdateTaskRequest,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

async fn load_task(state: &AppState, id: i64) -> Result<Task> {
    state
        .store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
}

pub(super) fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }
    Ok(())
}

/// List the caller's tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Tasks owned by the caller", body = Vec<TaskResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<TaskResponse>>> {
    let tasks = state.store.list_tasks_for(claims.subject_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Create a task owned by the caller
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>)> {
    require_title(&payload.title)?;

    let task = state
        .store
        .create_task(NewTask {
            owner_id: claims.subject_id,
            title: payload.title,
            description: payload.description,
            priority: payload.priority,
            status: payload.status,
            due_date: payload.due_date,
        })
        .await?;

    tracing::debug!(task_id = task.id, owner_id = task.owner_id, "task created");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Get a task
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Task belongs to another user"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>> {
    let task = load_task(&state, id).await?;
    ensure_owner(&claims, &task)?;

    Ok(Json(task.into()))
}

/// Update a task
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Task belongs to another user"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>> {
    let mut task = load_task(&state, id).await?;
    ensure_owner(&claims, &task)?;

    if let Some(title) = payload.title {
        require_title(&title)?;
        task.title = title;
    }
    if let Some(description) = payload.description {
        task.description = description;
    }
    if let Some(priority) = payload.priority {
        task.priority = priority;
    }
    if let Some(status) = payload.status {
        task.status = status;
    }
    if payload.due_date.is_some() {
        task.due_date = payload.due_date;
    }
    task.updated_at = Some(Utc::now());

    let task = state.store.update_task(task).await?;
    Ok(Json(task.into()))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Task belongs to another user"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let task = load_task(&state, id).await?;
    ensure_owner(&claims, &task)?;

    if !state.store.delete_task(task.id).await? {
        return Err(AppError::NotFound("Task not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Task deleted")))
}
