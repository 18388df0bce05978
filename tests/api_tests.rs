use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

use tasker::{
    AppState,
    auth::jwt::SecurityConfig,
    bootstrap_admin, create_app,
    db::{MemoryStore, Store},
    types::Role,
};

const TEST_SECRET: &str = "integration-test-secret-that-is-long-enough";
const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestApp {
    server: TestServer,
    state: AppState,
}

async fn create_test_app() -> TestApp {
    let security = SecurityConfig::new(TEST_SECRET.as_bytes().to_vec(), Duration::minutes(60))
        .expect("test security config");
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    bootstrap_admin(store.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to create admin");

    let state = AppState::new(store, &security);
    let server =
        TestServer::new(create_app(state.clone())).expect("Failed to create test server");

    TestApp { server, state }
}

async fn register(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": password,
            "first_name": "Test",
            "last_name": "User"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

async fn register_and_login(server: &TestServer, email: &str) -> (i64, String) {
    let user = register(server, email, "password123").await;
    let id = user["id"].as_i64().expect("user id");
    (id, login(server, email, "password123").await)
}

async fn create_task(server: &TestServer, token: &str, title: &str) -> i64 {
    let response = server
        .post("/api/tasks")
        .add_header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "title": title, "priority": "High" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().expect("task id")
}

// ============= Health & Docs =============

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_public() {
    let app = create_test_app().await;

    let response = app.server.get("/api/openapi.json").await;
    response.assert_status_ok();

    let doc = response.json::<Value>();
    assert!(doc["paths"]["/api/auth/login"].is_object());
    assert!(doc["paths"]["/api/tasks/{id}"].is_object());
}

// ============= Registration & Login =============

#[tokio::test]
async fn test_register_and_login() {
    let app = create_test_app().await;

    let user = register(&app.server, "alice@example.com", "correcthorse").await;
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["role"], "User");
    assert!(user.get("credential").is_none());

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "correcthorse" }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["role"], "User");
    assert_eq!(body["expires_in"], 3600);

    let token = body["token"].as_str().expect("token");
    let claims = app
        .state
        .tokens
        .validate(token, Utc::now())
        .expect("issued token validates");
    assert_eq!(claims.subject_id, user["id"].as_i64().expect("id"));
    assert_eq!(claims.role, Role::User);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = create_test_app().await;
    register(&app.server, "alice@example.com", "correcthorse").await;

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrongpass" }))
        .await;
    let unknown_email = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "wrongpass" }))
        .await;

    wrong_password.assert_status_unauthorized();
    unknown_email.assert_status_unauthorized();
    assert_eq!(wrong_password.text(), unknown_email.text());
    assert_eq!(
        wrong_password.json::<Value>()["error"],
        "Invalid credentials"
    );
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let app = create_test_app().await;
    register(&app.server, "Alice@Example.com", "correcthorse").await;

    login(&app.server, "alice@example.com", "correcthorse").await;
}

#[tokio::test]
async fn test_register_rejects_empty_password() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "alice@example.com", "password": "" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_test_app().await;
    register(&app.server, "alice@example.com", "correcthorse").await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "alice@example.com", "password": "another" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "User already exists");
}

// ============= Authentication =============

#[rstest]
#[case("/api/tasks")]
#[case("/api/users/1")]
#[case("/api/admin/users")]
#[case("/api/admin/tasks")]
#[tokio::test]
async fn test_protected_routes_require_token(#[case] path: &str) {
    let app = create_test_app().await;

    let response = app.server.get(path).await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["reason"], "unauthenticated");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", "Bearer not.a.token".to_string())
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "alice@example.com").await;

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let payload = &mut parts[1];
    let last = payload.pop().expect("payload not empty");
    payload.push(if last == 'A' { 'B' } else { 'A' });
    let tampered = parts.join(".");

    let response = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", format!("Bearer {}", &tampered))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_tampered_header_rejected() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "alice@example.com").await;

    let replacement = if token.starts_with('A') { "B" } else { "A" };
    let mut tampered = token.clone();
    tampered.replace_range(0..1, replacement);

    let response = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", format!("Bearer {}", &tampered))
        .await;
    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["reason"], "unauthenticated");
}

#[rstest]
#[case("bearer")]
#[case("BEARER")]
#[tokio::test]
async fn test_bearer_scheme_case_is_ignored(#[case] scheme: &str) {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "alice@example.com").await;

    app.server
        .get("/api/tasks")
        .add_header("Authorization", format!("{} {}", scheme, &token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = create_test_app().await;
    let (id, _) = register_and_login(&app.server, "alice@example.com").await;

    let stale = app
        .state
        .tokens
        .issue(id, Role::User, Utc::now() - Duration::minutes(61))
        .expect("issue");

    let response = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", format!("Bearer {}", &stale))
        .await;
    response.assert_status_unauthorized();
}

// ============= Roles =============

#[tokio::test]
async fn test_user_cannot_reach_admin_routes() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "alice@example.com").await;

    let response = app
        .server
        .get("/api/admin/users")
        .add_header("Authorization", format!("Bearer {}", &token))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["reason"], "insufficient_role");
}

#[tokio::test]
async fn test_role_change_takes_effect_on_next_login() {
    let app = create_test_app().await;
    let (id, old_token) = register_and_login(&app.server, "alice@example.com").await;
    let admin_token = login(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    app.server
        .patch(&format!("/api/admin/users/{}", id))
        .add_header("Authorization", format!("Bearer {}", &admin_token))
        .json(&json!({ "role": "Admin" }))
        .await
        .assert_status_ok();

    // Claims are fixed at issue time.
    app.server
        .get("/api/admin/users")
        .add_header("Authorization", format!("Bearer {}", &old_token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let new_token = login(&app.server, "alice@example.com", "password123").await;
    app.server
        .get("/api/admin/users")
        .add_header("Authorization", format!("Bearer {}", &new_token))
        .await
        .assert_status_ok();
}

// ============= Ownership =============

#[tokio::test]
async fn test_task_ownership_enforced() {
    let app = create_test_app().await;
    let (_, alice) = register_and_login(&app.server, "alice@example.com").await;
    let (_, bob) = register_and_login(&app.server, "bob@example.com").await;
    let admin = login(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let task_id = create_task(&app.server, &alice, "alice's task").await;
    let path = format!("/api/tasks/{}", task_id);

    app.server
        .get(&path)
        .add_header("Authorization", format!("Bearer {}", &alice))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get(&path)
        .add_header("Authorization", format!("Bearer {}", &bob))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["reason"], "not_owner");

    app.server
        .patch(&path)
        .add_header("Authorization", format!("Bearer {}", &bob))
        .json(&json!({ "title": "hijacked" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .delete(&path)
        .add_header("Authorization", format!("Bearer {}", &bob))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get(&path)
        .add_header("Authorization", format!("Bearer {}", &admin))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["title"], "alice's task");
}

#[tokio::test]
async fn test_missing_task_is_not_found() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "alice@example.com").await;

    app.server
        .get("/api/tasks/999")
        .add_header("Authorization", format!("Bearer {}", &token))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_task_lifecycle() {
    let app = create_test_app().await;
    let (alice_id, alice) = register_and_login(&app.server, "alice@example.com").await;
    let (_, bob) = register_and_login(&app.server, "bob@example.com").await;

    let task_id = create_task(&app.server, &alice, "write report").await;
    create_task(&app.server, &bob, "bob's task").await;

    let tasks = app
        .server
        .get("/api/tasks")
        .add_header("Authorization", format!("Bearer {}", &alice))
        .await
        .json::<Vec<Value>>();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["owner_id"], alice_id);
    assert_eq!(tasks[0]["status"], "New");

    let response = app
        .server
        .patch(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", format!("Bearer {}", &alice))
        .json(&json!({ "status": "Completed" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "Completed");
    assert_eq!(body["title"], "write report");
    assert!(!body["updated_at"].is_null());

    app.server
        .delete(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", format!("Bearer {}", &alice))
        .await
        .assert_status_ok();
    app.server
        .get(&format!("/api/tasks/{}", task_id))
        .add_header("Authorization", format!("Bearer {}", &alice))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_create_task_requires_title() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "alice@example.com").await;

    app.server
        .post("/api/tasks")
        .add_header("Authorization", format!("Bearer {}", &token))
        .json(&json!({ "title": "   " }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_profile_ownership_and_password_change() {
    let app = create_test_app().await;
    let (alice_id, alice) = register_and_login(&app.server, "alice@example.com").await;
    let (_, bob) = register_and_login(&app.server, "bob@example.com").await;
    let path = format!("/api/users/{}", alice_id);

    let response = app
        .server
        .get(&path)
        .add_header("Authorization", format!("Bearer {}", &bob))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["reason"], "not_owner");

    app.server
        .patch(&path)
        .add_header("Authorization", format!("Bearer {}", &alice))
        .json(&json!({ "password": "" }))
        .await
        .assert_status_bad_request();

    let response = app
        .server
        .patch(&path)
        .add_header("Authorization", format!("Bearer {}", &alice))
        .json(&json!({ "first_name": "Alicia", "password": "new-password" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["first_name"], "Alicia");
    assert_eq!(body["role"], "User");

    app.server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "password123" }))
        .await
        .assert_status_unauthorized();
    login(&app.server, "alice@example.com", "new-password").await;
}

#[tokio::test]
async fn test_profile_update_cannot_change_role() {
    let app = create_test_app().await;
    let (alice_id, alice) = register_and_login(&app.server, "alice@example.com").await;

    let response = app
        .server
        .patch(&format!("/api/users/{}", alice_id))
        .add_header("Authorization", format!("Bearer {}", &alice))
        .json(&json!({ "role": "Admin" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["role"], "User");
}

#[tokio::test]
async fn test_profile_details_are_stored_and_patched() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": "alice@example.com",
            "password": "password123",
            "first_name": "Alice",
            "last_name": "Smith",
            "date_of_birth": "1990-04-02T00:00:00Z",
            "gender": "F",
            "city": "Lagos",
            "emergency_contact": "+234 800 000 0000"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let user = response.json::<Value>();
    assert_eq!(user["city"], "Lagos");
    assert_eq!(user["date_of_birth"], "1990-04-02T00:00:00Z");

    let id = user["id"].as_i64().expect("user id");
    let token = login(&app.server, "alice@example.com", "password123").await;
    let path = format!("/api/users/{}", id);

    app.server
        .patch(&path)
        .add_header("Authorization", format!("Bearer {}", &token))
        .json(&json!({ "city": "Abuja", "zip_code": "900001" }))
        .await
        .assert_status_ok();

    let body = app
        .server
        .get(&path)
        .add_header("Authorization", format!("Bearer {}", &token))
        .await
        .json::<Value>();
    assert_eq!(body["city"], "Abuja");
    assert_eq!(body["zip_code"], "900001");
    assert_eq!(body["gender"], "F");
    assert_eq!(body["emergency_contact"], "+234 800 000 0000");
    assert!(body["address"].is_null());
}

// ============= Administration =============

#[tokio::test]
async fn test_admin_creates_user_with_role() {
    let app = create_test_app().await;
    let admin = login(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/api/admin/users")
        .add_header("Authorization", format!("Bearer {}", &admin))
        .json(&json!({
            "email": "ops@example.com",
            "password": "ops-password",
            "role": "Admin"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["role"], "Admin");

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ops@example.com", "password": "ops-password" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["role"], "Admin");
}

#[tokio::test]
async fn test_admin_lists_users_with_tasks() {
    let app = create_test_app().await;
    let (alice_id, alice) = register_and_login(&app.server, "alice@example.com").await;
    create_task(&app.server, &alice, "one").await;
    create_task(&app.server, &alice, "two").await;
    let admin = login(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let users = app
        .server
        .get("/api/admin/users")
        .add_header("Authorization", format!("Bearer {}", &admin))
        .await
        .json::<Vec<Value>>();
    assert_eq!(users.len(), 2);

    let alice_entry = users
        .iter()
        .find(|u| u["id"] == alice_id)
        .expect("alice listed");
    assert_eq!(alice_entry["tasks"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_admin_delete_user_cascades_tasks() {
    let app = create_test_app().await;
    let (alice_id, alice) = register_and_login(&app.server, "alice@example.com").await;
    let (_, bob) = register_and_login(&app.server, "bob@example.com").await;
    create_task(&app.server, &alice, "alice one").await;
    create_task(&app.server, &alice, "alice two").await;
    create_task(&app.server, &bob, "bob one").await;
    let admin = login(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let path = format!("/api/admin/users/{}", alice_id);
    app.server
        .delete(&path)
        .add_header("Authorization", format!("Bearer {}", &admin))
        .await
        .assert_status_ok();
    app.server
        .delete(&path)
        .add_header("Authorization", format!("Bearer {}", &admin))
        .await
        .assert_status_not_found();

    let tasks = app
        .server
        .get("/api/admin/tasks")
        .add_header("Authorization", format!("Bearer {}", &admin))
        .await
        .json::<Vec<Value>>();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "bob one");
}

#[tokio::test]
async fn test_admin_update_edits_only_the_users_tasks() {
    let app = create_test_app().await;
    let (alice_id, alice) = register_and_login(&app.server, "alice@example.com").await;
    let (_, bob) = register_and_login(&app.server, "bob@example.com").await;
    let alice_task = create_task(&app.server, &alice, "draft").await;
    let untouched = create_task(&app.server, &alice, "keep me").await;
    let bob_task = create_task(&app.server, &bob, "bob's").await;
    let admin = login(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .patch(&format!("/api/admin/users/{}", alice_id))
        .add_header("Authorization", format!("Bearer {}", &admin))
        .json(&json!({
            "last_name": "Jones",
            "tasks": [
                { "id": alice_task, "title": "final", "status": "Completed" },
                { "id": bob_task, "title": "stolen" }
            ]
        }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["last_name"], "Jones");
    let tasks = body["tasks"].as_array().expect("tasks inlined");
    assert_eq!(tasks.len(), 2);

    let edited = tasks
        .iter()
        .find(|t| t["id"] == alice_task)
        .expect("edited task listed");
    assert_eq!(edited["title"], "final");
    assert_eq!(edited["status"], "Completed");
    assert!(!edited["updated_at"].is_null());

    let kept = tasks
        .iter()
        .find(|t| t["id"] == untouched)
        .expect("other task listed");
    assert_eq!(kept["title"], "keep me");
    assert!(kept["updated_at"].is_null());

    let response = app
        .server
        .get(&format!("/api/tasks/{}", bob_task))
        .add_header("Authorization", format!("Bearer {}", &bob))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["title"], "bob's");
}

#[tokio::test]
async fn test_admin_task_edit_with_blank_title_writes_nothing() {
    let app = create_test_app().await;
    let (alice_id, alice) = register_and_login(&app.server, "alice@example.com").await;
    let task_id = create_task(&app.server, &alice, "draft").await;
    let admin = login(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    app.server
        .patch(&format!("/api/admin/users/{}", alice_id))
        .add_header("Authorization", format!("Bearer {}", &admin))
        .json(&json!({
            "first_name": "Changed",
            "tasks": [{ "id": task_id, "title": "  " }]
        }))
        .await
        .assert_status_bad_request();

    let user = app
        .server
        .get(&format!("/api/users/{}", alice_id))
        .add_header("Authorization", format!("Bearer {}", &alice))
        .await
        .json::<Value>();
    assert_eq!(user["first_name"], "Test");
}
