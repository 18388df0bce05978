//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for Tasker, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions, policies and the OpenAPI document
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/auth`, public)
//! - `POST /api/auth/register` - Register a new user
//! - `POST /api/auth/login` - Login and receive a bearer token
//!
//! ## Users (members, owner only)
//! - `GET /api/users/{id}` - Get a profile
//! - `PATCH /api/users/{id}` - Update a profile or change password
//!
//! ## Tasks (members)
//! - `GET /api/tasks` - List the caller's tasks
//! - `POST /api/tasks` - Create a task
//! - `GET /api/tasks/{id}` - Get a task (owner only)
//! - `PATCH /api/tasks/{id}` - Update a task (owner only)
//! - `DELETE /api/tasks/{id}` - Delete a task (owner only)
//!
//! ## Administration (admins)
//! - `GET /api/admin/users` - List all users with their tasks
//! - `POST /api/admin/users` - Create a user with any role
//! - `PATCH /api/admin/users/{id}` - Update a user, including role
//! - `DELETE /api/admin/users/{id}` - Delete a user and their tasks
//! - `GET /api/admin/tasks` - List all tasks
//!
//! # Authentication
//!
//! Protected endpoints require a valid token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! Denials answer `401` (no or invalid token) or `403` (wrong role, not the
//! owner) with a JSON body carrying a `reason`.
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api/openapi.json`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
