use crate::AppState;
use crate::api::handlers::{admin, auth, tasks, users};
use crate::auth::middleware::{PolicyGuard, enforce_policy};
use crate::auth::policy::{Authorizer, DecisionReason, Policy};
use crate::types::*;
use axum::{
    Json, Router, middleware,
    routing::{get, patch, post},
};
use utoipa::OpenApi;

/// OpenAPI description of the `/api` surface.
#[derive(OpenApi)]
#[openapi(
    info(title = "Tasker API"),
    paths(
        auth::register,
        auth::login,
        users::get_user,
        users::update_user,
        tasks::list_tasks,
        tasks::create_task,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        admin::list_users,
        admin::create_user,
        admin::update_user,
        admin::delete_user,
        admin::list_tasks,
    ),
    components(schemas(
        Role,
        TaskPriority,
        TaskStatus,
        DecisionReason,
        LoginRequest,
        LoginResponse,
        RegisterRequest,
        MessageResponse,
        Profile,
        UserResponse,
        UpdateProfileRequest,
        AdminCreateUserRequest,
        AdminTaskPatch,
        AdminUpdateUserRequest,
        AdminUserResponse,
        CreateTaskRequest,
        UpdateTaskRequest,
        TaskResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Self-service profiles"),
        (name = "tasks", description = "The caller's tasks"),
        (name = "admin", description = "Administration")
    )
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the `/api` router.
///
/// Every non-public group carries its role policy as a layer; ownership is
/// checked by the handlers once the target resource has been loaded.
pub fn create_router(authorizer: Authorizer) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/openapi.json", get(openapi));

    let member_routes = Router::new()
        .route(
            "/users/{id}",
            get(users::get_user).patch(users::update_user),
        )
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            PolicyGuard::new(authorizer.clone(), Policy::members()),
            enforce_policy,
        ));

    let admin_routes = Router::new()
        .route(
            "/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route(
            "/admin/users/{id}",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/admin/tasks", get(admin::list_tasks))
        .route_layer(middleware::from_fn_with_state(
            PolicyGuard::new(authorizer, Policy::admin_only()),
            enforce_policy,
        ));

    public_routes.merge(member_routes).merge(admin_routes)
}
