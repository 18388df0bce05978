//! Self-service profile handlers.
//!
//! Both routes require ownership of the account; administrators pass the
//! ownership check for any account.

use crate::{
    AppState,
    auth::{middleware::AuthUser, ownership::ensure_owner, password},
    db::Account,
    types::{AppError, Result, UpdateProfileRequest, UserResponse},
};
use axum::{
    Json,
    extract::{Path, State},
};

async fn load_account(state: &AppState, id: i64) -> Result<Account> {
    state
        .store
        .find_account_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Get a user profile
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the owner of this account"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>> {
    let account = load_account(&state, id).await?;
    ensure_owner(&claims, &account)?;

    Ok(Json(UserResponse::from(&account)))
}

/// Update a user profile
///
/// Supplying a password replaces the stored credential with a fresh one.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the owner of this account"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    let mut account = load_account(&state, id).await?;
    ensure_owner(&claims, &account)?;

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
    account.profile.apply(payload.profile);
    if let Some(new_password) = payload.password {
        account.credential = password::hash(&new_password)?;
        tracing::info!(user_id = account.id, "password changed");
    }

    let account = state.store.update_account(account).await?;
    Ok(Json(UserResponse::from(&account)))
}
