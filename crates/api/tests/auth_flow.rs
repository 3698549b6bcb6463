//! Registration, login, logout and session handling through the HTML forms.

mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_string, session_cookie_for, TEST_SESSION_SECRET};
use inkwell_db::Store;

#[tokio::test]
async fn register_then_log_in() {
    let app = common::build_test_app();
    let mut browser = app.browser();

    let response = browser.register("ada", "analytical-engine").await;
    assert_redirect(&response, "/login");
    let html = browser.page("/login").await;
    assert!(html.contains("Registration successful. Please log in."));

    let response = browser.log_in("ada", "analytical-engine").await;
    assert_redirect(&response, "/");
    let html = browser.page("/").await;
    assert!(html.contains("Welcome back, ada!"));
    assert!(html.contains(r#"action="/logout""#));

    let user = app.user("ada").await;
    assert!(user.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn duplicate_registration_leaves_original_untouched() {
    let app = common::build_test_app();
    let original = app.create_user("ada", "first-password").await;
    let mut browser = app.browser();

    let response = browser.register("ada", "second-password").await;
    assert_redirect(&response, "/register");
    let html = browser.page("/register").await;
    assert!(html.contains("Username is already taken."));

    let stored = app.user("ada").await;
    assert_eq!(stored.id, original.id);
    assert_eq!(stored.password_hash, original.password_hash);

    let response = browser.log_in("ada", "first-password").await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn invalid_registration_shows_every_error() {
    let app = common::build_test_app();
    let mut browser = app.browser();
    let token = browser.csrf_token().await;

    let response = browser
        .post_form(
            "/register",
            &[
                ("username", "a!"),
                ("password", "short"),
                ("confirm_password", "other"),
                ("_csrf", &token),
            ],
        )
        .await;
    assert_redirect(&response, "/register");

    let html = browser.page("/register").await;
    assert!(html.contains("Password must be at least 8 characters."));
    assert!(html.contains("Username must be between 3 and 32 characters."));
    assert!(html.contains("Passwords do not match."));
    assert!(app.store.find_user_by_username("a!").await.unwrap().is_none());

    // Errors are shown once.
    let html = browser.page("/register").await;
    assert!(!html.contains("Passwords do not match."));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = common::build_test_app();
    app.create_user("ada", "analytical-engine").await;
    let mut browser = app.browser();

    let response = browser.log_in("ada", "difference-engine").await;
    assert_redirect(&response, "/login");
    let html = browser.page("/login").await;
    assert!(html.contains("Invalid username or password."));

    let response = browser.log_in("nobody", "whatever-password").await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn logout_makes_guarded_pages_anonymous() {
    let app = common::build_test_app();
    app.create_user("ada", "analytical-engine").await;
    let mut browser = app.browser();

    browser.log_in("ada", "analytical-engine").await;
    assert_eq!(browser.get("/profile").await.status(), StatusCode::OK);

    let response = browser.log_out().await;
    assert_redirect(&response, "/");
    let html = browser.page("/").await;
    assert!(html.contains("You have been logged out."));

    let response = browser.get("/profile").await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn form_post_without_csrf_token_is_forbidden() {
    let app = common::build_test_app();
    let mut browser = app.browser();
    browser.csrf_token().await;

    let response = browser
        .post_form(
            "/register",
            &[
                ("username", "mallory"),
                ("password", "sneaky-password"),
                ("confirm_password", "sneaky-password"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_string(response).await.contains("CSRF"));

    let response = browser
        .post_form(
            "/register",
            &[
                ("username", "mallory"),
                ("password", "sneaky-password"),
                ("confirm_password", "sneaky-password"),
                ("_csrf", "not-the-token"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.store.find_user_by_username("mallory").await.unwrap().is_none());
}

#[tokio::test]
async fn csrf_token_is_accepted_from_header() {
    let app = common::build_test_app();
    app.create_user("ada", "analytical-engine").await;
    let mut browser = app.browser();
    let token = browser.csrf_token().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("x-csrf-token", token)
        .body(axum::body::Body::from("username=ada&password=analytical-engine"))
        .unwrap();
    let response = browser.send(request).await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn tampered_session_cookie_is_anonymous() {
    let app = common::build_test_app();
    app.create_user("ada", "analytical-engine").await;
    let mut browser = app.browser();
    browser.log_in("ada", "analytical-engine").await;
    assert_eq!(browser.get("/profile").await.status(), StatusCode::OK);

    let mut cookie = browser.cookie.clone().unwrap();
    let middle = "session=".len() + (cookie.len() - "session=".len()) / 2;
    let replacement = if &cookie[middle..=middle] == "A" { "B" } else { "A" };
    cookie.replace_range(middle..=middle, replacement);
    browser.cookie = Some(cookie);

    let response = browser.get("/profile").await;
    assert_redirect(&response, "/login");
}

#[tokio::test]
async fn cookie_from_another_secret_is_anonymous() {
    let app = common::build_test_app();
    app.create_user("ada", "analytical-engine").await;

    let mut browser = app.browser();
    browser.cookie = Some(session_cookie_for(&app.config, "some-other-secret", "ada"));
    let response = browser.get("/profile").await;
    assert_redirect(&response, "/login");

    // The same identity sealed with the server's own secret is honoured.
    browser.cookie = Some(session_cookie_for(&app.config, TEST_SESSION_SECRET, "ada"));
    assert_eq!(browser.get("/profile").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_for_a_deleted_account_is_reset() {
    let app = common::build_test_app();
    let mut browser = app.browser();
    browser.cookie = Some(session_cookie_for(&app.config, TEST_SESSION_SECRET, "ghost"));

    let response = browser.get("/profile").await;
    assert_redirect(&response, "/login");

    let html = browser.page("/login").await;
    assert!(html.contains("Please log in to view this page."));
    assert!(html.contains(r#"href="/register""#), "identity cleared: {html}");
    assert!(!html.contains(r#"action="/logout""#));

    assert_redirect(&browser.get("/create").await, "/login");
}
