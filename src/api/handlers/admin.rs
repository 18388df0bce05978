//! Administrator handlers.
//!
//! Mounted behind the admin-only policy; no ownership checks apply here.

use crate::{
    AppState,
    api::handlers::tasks::require_title,
    auth::{middleware::AuthUser, password},
    db::{NewAccount, Task},
    types::{
        AdminCreateUserRequest, AdminTaskPatch, AdminUpdateUserRequest, AdminUserResponse,
        AppError, MessageResponse, Result, TaskResponse, UserResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

/// List all users with their tasks
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = Vec<AdminUserResponse>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an administrator")
    ),
    tag = "admin"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<AdminUserResponse>>> {
    let accounts = state.store.list_accounts().await?;

    let mut users = Vec::with_capacity(accounts.len());
    for account in &accounts {
        let tasks = state.store.list_tasks_for(account.id).await?;
        users.push(AdminUserResponse {
            user: UserResponse::from(account),
            tasks: tasks.into_iter().map(TaskResponse::from).collect(),
        });
    }

    Ok(Json(users))
}

/// Create a user with any role
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = AdminCreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input or user already exists"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an administrator")
    ),
    tag = "admin"
)]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if payload.email.trim().is_empty() {
        return Err(AppError::InvalidInput("Email is required".to_string()));
    }

    let credential = password::hash(&payload.password)?;
    let account = state
        .store
        .create_account(NewAccount {
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone_number: payload.phone_number,
            role: payload.role,
            profile: payload.profile,
            credential,
        })
        .await?;

    tracing::info!(
        admin_id = claims.subject_id,
        user_id = account.id,
        role = %account.role,
        "user created by admin"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from(&account))))
}

/// Apply one task edit in place, stamping `updated_at`.
fn apply_task_patch(task: &mut Task, patch: AdminTaskPatch) -> Result<()> {
    if let Some(title) = patch.title {
        require_title(&title)?;
        task.title = title;
    }
    if let Some(description) = patch.description {
        task.description = description;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if patch.due_date.is_some() {
        task.due_date = patch.due_date;
    }
    task.updated_at = Some(Utc::now());
    Ok(())
}

/// Update any user, including their role and their tasks
///
/// Task edits apply only to tasks the user owns; other ids are skipped.
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = AdminUserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "User not found")
    ),
    tag = "admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<Json<AdminUserResponse>> {
    let mut account = state
        .store
        .find_account_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(email) = payload.email {
        if email.trim().is_empty() {
            return Err(AppError::InvalidInput("Email is required".to_string()));
        }
        account.email = email;
    }
    if let Some(first_name) = payload.first_name {
        account.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        account.last_name = last_name;
    }
    if let Some(phone_number) = payload.phone_number {
        account.phone_number = Some(phone_number);
    }
    if let Some(role) = payload.role {
        if role != account.role {
            tracing::warn!(
                admin_id = claims.subject_id,
                user_id = account.id,
                from = %account.role,
                to = %role,
                "role changed"
            );
        }
        account.role = role;
    }
    account.profile.apply(payload.profile);

    // Validate every task edit before anything is written.
    let mut tasks = state.store.list_tasks_for(account.id).await?;
    let mut changed = Vec::new();
    for patch in payload.tasks {
        let Some(index) = tasks.iter().position(|t| t.id == patch.id) else {
            tracing::debug!(user_id = account.id, task_id = patch.id, "task edit skipped");
            continue;
        };
        apply_task_patch(&mut tasks[index], patch)?;
        if !changed.contains(&index) {
            changed.push(index);
        }
    }

    let account = state.store.update_account(account).await?;
    for index in changed {
        tasks[index] = state.store.update_task(tasks[index].clone()).await?;
    }

    Ok(Json(AdminUserResponse {
        user: UserResponse::from(&account),
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
    }))
}

/// Delete a user and all of their tasks
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "User not found")
    ),
    tag = "admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    if !state.store.delete_account(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(admin_id = claims.subject_id, user_id = id, "user deleted");

    Ok(Json(MessageResponse::new("User deleted")))
}

/// List every task in the system
#[utoipa::path(
    get,
    path = "/api/admin/tasks",
    responses(
        (status = 200, description = "All tasks", body = Vec<TaskResponse>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an administrator")
    ),
    tag = "admin"
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskResponse>>> {
    let tasks = state.store.list_tasks().await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}
