//! Authentication and Authorization
//!
//! This module is the security core of Tasker: password credentials, signed
//! bearer tokens, and the decision point that gates every protected route.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - salted HMAC-SHA512 credentials
//! - [`auth::jwt`](crate::auth::jwt) - HS256 token issuance and validation
//! - [`auth::policy`](crate::auth::policy) - policies and the authorization decision point
//! - [`auth::ownership`](crate::auth::ownership) - the resource ownership guard
//! - [`auth::middleware`](crate::auth::middleware) - Axum layer and extractor
//!
//! # Usage
//!
//! ## Credentials
//!
//! ```ignore
//! use tasker::auth::password;
//!
//! let credential = password::hash("correcthorse")?;
//! assert!(password::verify("correcthorse", &credential.digest, &credential.salt));
//! ```
//!
//! ## Tokens
//!
//! ```ignore
//! use tasker::auth::jwt::{SecurityConfig, TokenService};
//!
//! let security = SecurityConfig::new(secret_bytes, chrono::Duration::minutes(60))?;
//! let tokens = TokenService::new(&security);
//! let token = tokens.issue(user_id, Role::User, Utc::now())?;
//! let claims = tokens.validate(&token, Utc::now())?;
//! ```
//!
//! ## Guarding Routes
//!
//! ```ignore
//! use tasker::auth::middleware::{enforce_policy, PolicyGuard};
//! use tasker::auth::policy::Policy;
//!
//! let admin = Router::new()
//!     .route("/admin/users", get(list_users))
//!     .layer(middleware::from_fn_with_state(
//!         PolicyGuard::new(authorizer, Policy::admin_only()),
//!         enforce_policy,
//!     ));
//! ```
//!
//! Handlers then take [`AuthUser`](crate::auth::middleware::AuthUser) and,
//! for owned resources, call
//! [`ensure_owner`](crate::auth::ownership::ensure_owner) once the resource
//! is loaded.
//!
//! # Configuration
//!
//! Configure via `tasker.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"   # env var holding the secret, at least 32 bytes
//! token_lifetime_minutes = 60
//! ```

/// JWT token issuance and validation.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Resource ownership guard.
pub mod ownership;
/// Password hashing and verification.
pub mod password;
/// Policies and the authorization decision point.
pub mod policy;
