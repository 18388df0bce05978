use crate::auth::ownership::Owned;
use crate::auth::password::Credential;
use crate::types::{Profile, Role, TaskPriority, TaskResponse, TaskStatus, UserResponse};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub profile: Profile,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
}

/// An account is owned by itself.
impl Owned for Account {
    fn owner_id(&self) -> i64 {
        self.id
    }
}

impl From<&Account> for UserResponse {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            email: a.email.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            phone_number: a.phone_number.clone(),
            role: a.role,
            profile: a.profile.clone(),
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub profile: Profile,
    pub credential: Credential,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
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

impl Owned for Task {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            owner_id: t.owner_id,
            title: t.title,
            description: t.description,
            priority: t.priority,
            status: t.status,
            due_date: t.due_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

/// Canonical form used for storing and comparing emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
