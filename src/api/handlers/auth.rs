use crate::{
    AppState,
    auth::password,
    db::NewAccount,
    types::{
        AppError, LoginRequest, LoginResponse, RegisterRequest, Result, Role, UserResponse,
    },
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid input or user already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
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
            role: Role::User,
            profile: payload.profile,
            credential,
        })
        .await?;

    tracing::info!(user_id = account.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&account))))
}

/// Login with email and password
///
/// Unknown email and wrong password produce the same response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let Some(account) = state.store.find_account_by_email(&payload.email).await? else {
        password::verify_dummy(&payload.password);
        tracing::debug!("login failed");
        return Err(AppError::InvalidCredentials);
    };

    if !account.credential.matches(&payload.password) {
        tracing::debug!(user_id = account.id, "login failed");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(account.id, account.role, Utc::now())?;

    tracing::info!(user_id = account.id, role = %account.role, "user logged in");

    Ok(Json(LoginResponse {
        token,
        role: account.role,
        expires_in: state.tokens.lifetime_secs(),
    }))
}
