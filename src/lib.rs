//! # Tasker
//!
//! A task-management API server with a self-contained authentication and
//! authorization core.
//!
//! ## Overview
//!
//! Tasker can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `tasker-server` binary
//! 2. **As a library** - Build the router around your own [`db::Store`]
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use tasker::{AppState, create_app};
//! use tasker::auth::jwt::SecurityConfig;
//! use tasker::db::MemoryStore;
//! use std::sync::Arc;
//!
//! let security = SecurityConfig::new(secret_bytes, chrono::Duration::minutes(60))?;
//! let state = AppState::new(Arc::new(MemoryStore::new()), &security);
//! let app = create_app(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Credentials, tokens, policies and ownership
//! - [`cli`] - Command-line interface
//! - [`db`] - Storage abstraction and the in-memory store
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration loading
//!
//! ## Security Model
//!
//! Every protected route declares a [`Policy`](auth::policy::Policy). The
//! [`Authorizer`](auth::policy::Authorizer) validates the bearer token and
//! checks the caller's role; handlers for owned resources then apply the
//! [ownership guard](auth::ownership) to the loaded resource.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Authentication and authorization.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Storage abstraction.
pub mod db;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use types::{AppError, Result};
pub use utils::toml_config::TaskerConfig;

use crate::auth::jwt::{SecurityConfig, TokenService};
use crate::auth::password;
use crate::auth::policy::Authorizer;
use crate::db::{NewAccount, Store};
use crate::types::{Profile, Role};
use axum::{Json, Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Account and task storage
    pub store: Arc<dyn Store>,
    /// Token issuer and validator
    pub tokens: Arc<TokenService>,
    /// Decision point used by the route policies
    pub authorizer: Authorizer,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, security: &SecurityConfig) -> Self {
        let tokens = Arc::new(TokenService::new(security));
        Self {
            store,
            authorizer: Authorizer::new(tokens.clone()),
            tokens,
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the full application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api::routes::create_router(state.authorizer.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Ensure an administrator account exists for `email`.
///
/// An existing account with that email is promoted to `Admin`; its password
/// is left untouched.
pub async fn bootstrap_admin(store: &dyn Store, email: &str, password: &str) -> Result<()> {
    if let Some(mut account) = store.find_account_by_email(email).await? {
        if account.role != Role::Admin {
            account.role = Role::Admin;
            store.update_account(account).await?;
            tracing::info!(email, "existing account promoted to admin");
        }
        return Ok(());
    }

    let account = store
        .create_account(NewAccount {
            email: email.to_string(),
            first_name: "Admin".to_string(),
            last_name: String::new(),
            phone_number: None,
            role: Role::Admin,
            profile: Profile::default(),
            credential: password::hash(password)?,
        })
        .await?;

    tracing::info!(user_id = account.id, "admin account created");
    Ok(())
}
