use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::policy::DecisionReason;

// ============= Identity Types =============

/// Privilege level carried in token claims.
///
/// Serialized as `"User"` / `"Admin"`. Unknown values are rejected at
/// deserialization time, so a token naming any other role is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Whether this role bypasses ownership checks.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("User"),
            Role::Admin => f.write_str("Admin"),
        }
    }
}

/// Identity claims recovered from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub subject_id: i64,
    pub role: Role,
    /// Seconds since the Unix epoch
    pub issued_at: i64,
    /// Seconds since the Unix epoch; always greater than `issued_at`
    pub expires_at: i64,
}

// ============= Task Types =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Completed,
}

// ============= Profile Types =============

/// Optional personal details kept alongside an account.
///
/// Used both as stored data and as a patch: in update requests an absent
/// field leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    #[serde(default)]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl Profile {
    /// Overwrite every field that is set in `patch`.
    pub fn apply(&mut self, patch: Profile) {
        fn set<T>(field: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *field = value;
            }
        }

        set(&mut self.date_of_birth, patch.date_of_birth);
        set(&mut self.gender, patch.gender);
        set(&mut self.nationality, patch.nationality);
        set(&mut self.address, patch.address);
        set(&mut self.city, patch.city);
        set(&mut self.state, patch.state);
        set(&mut self.zip_code, patch.zip_code);
        set(&mut self.emergency_contact, patch.emergency_contact);
        set(&mut self.profile_picture_url, patch.profile_picture_url);
    }
}

// ============= Authentication Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Compact signed token for the `Authorization: Bearer` header
    pub token: String,
    pub role: Role,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============= User Types =============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

/// Self-service profile update. Every field is optional; absent fields are
/// left untouched. Supplying `password` replaces the stored credential.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminCreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Edit of one of the target user's tasks, carried inside an admin update.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminTaskPatch {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminUpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
    #[serde(flatten)]
    pub profile: Profile,
    /// Task edits; entries naming tasks the user does not own are ignored.
    #[serde(default)]
    pub tasks: Vec<AdminTaskPatch>,
}

/// User entry for administrators, with the user's tasks inlined.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub tasks: Vec<TaskResponse>,
}

// ============= Task DTOs =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthenticated,

    /// Login failure. Deliberately identical for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied: {0}")]
    Forbidden(DecisionReason),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DecisionReason> for AppError {
    fn from(reason: DecisionReason) -> Self {
        match reason {
            DecisionReason::Unauthenticated => AppError::Unauthenticated,
            other => AppError::Forbidden(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message, reason) = match self {
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "You need to login first.".to_string(),
                Some(DecisionReason::Unauthenticated),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                None,
            ),
            AppError::Forbidden(reason) => {
                (reason.status(), reason.message().to_string(), Some(reason))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg, None),
            // Internal diagnostics stay in the logs.
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = match reason {
            Some(reason) => serde_json::json!({ "error": message, "reason": reason }),
            None => serde_json::json!({ "error": message }),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
