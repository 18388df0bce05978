//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Administrator user and task management.
pub mod admin;
/// Authentication handlers (login, register).
pub mod auth;
/// Task CRUD for the caller's own tasks.
pub mod tasks;
/// Self-service profile handlers.
pub mod users;
