#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use inkwell_api::auth::password::hash_password;
use inkwell_api::chat::ChatHub;
use inkwell_api::config::ServerConfig;
use inkwell_api::router::build_app_router;
use inkwell_api::session::{seal_session, session_key};
use inkwell_api::state::AppState;
use inkwell_core::session::{SessionData, SessionUser};
use inkwell_db::models::user::{CreateUser, User};
use inkwell_db::{DynStore, MemoryStore, Store};

/// Largest avatar body accepted by the test app.
pub const TEST_MAX_UPLOAD_BYTES: usize = 16 * 1024;

pub const TEST_SESSION_SECRET: &str = "integration-test-session-secret";

/// A router wired to an in-memory store and a throwaway upload directory.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: Arc<ServerConfig>,
    /// Kept alive for the duration of the test.
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Start a fresh browser with an empty cookie jar.
    pub fn browser(&self) -> Browser {
        Browser::new(self.router.clone())
    }

    /// Insert a user directly into the store.
    pub async fn create_user(&self, username: &str, password: &str) -> User {
        let password_hash = hash_password(password).expect("hashing should succeed");
        self.store
            .create_user(&CreateUser {
                username: username.to_string(),
                password_hash,
            })
            .await
            .expect("user creation should succeed")
    }

    pub async fn user(&self, username: &str) -> User {
        self.store
            .find_user_by_username(username)
            .await
            .unwrap()
            .expect("user should exist")
    }
}

pub fn test_config(upload_dir: &TempDir) -> ServerConfig {
    let upload_dir = upload_dir.path().to_string_lossy().into_owned();
    let max_upload = TEST_MAX_UPLOAD_BYTES.to_string();
    ServerConfig::from_lookup(|key| match key {
        "HOST" => Some("127.0.0.1".into()),
        "SESSION_SECRET" => Some(TEST_SESSION_SECRET.into()),
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        "MAX_UPLOAD_BYTES" => Some(max_upload.clone()),
        _ => None,
    })
    .expect("test config should load")
}

/// Build the full application router exactly as `main.rs` does, backed by
/// the memory store.
pub fn build_test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().expect("tempdir should be created");
    let config = Arc::new(test_config(&upload_dir));
    let store = Arc::new(MemoryStore::new());

    let state = AppState {
        store: store.clone() as DynStore,
        config: config.clone(),
        cookie_key: session_key(&config.session.secret).unwrap(),
        chat: Arc::new(ChatHub::new()),
    };

    TestApp {
        router: build_app_router(state),
        store,
        config,
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Browser: a cookie-carrying client for the HTML site
// ---------------------------------------------------------------------------

/// Replays the session cookie between requests like a browser would.
pub struct Browser {
    app: Router,
    pub cookie: Option<String>,
}

impl Browser {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(COOKIE, cookie.parse().unwrap());
        }
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.trim().to_string());
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// GET a page and return its body.
    pub async fn page(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        body_string(response).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_encode(fields)))
            .unwrap();
        self.send(request).await
    }

    /// POST a multipart body with text fields and at most one file.
    pub async fn post_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Response<Body> {
        let (content_type, body) = multipart_body(fields, file);
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Load a page and pull the CSRF token out of its forms.
    pub async fn csrf_token(&mut self) -> String {
        let html = self.page("/login").await;
        extract_csrf(&html).expect("page should embed a CSRF token")
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Response<Body> {
        let token = self.csrf_token().await;
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("password", password),
                ("confirm_password", password),
                ("_csrf", &token),
            ],
        )
        .await
    }

    pub async fn log_in(&mut self, username: &str, password: &str) -> Response<Body> {
        let token = self.csrf_token().await;
        self.post_form(
            "/login",
            &[("username", username), ("password", password), ("_csrf", &token)],
        )
        .await
    }

    pub async fn log_out(&mut self) -> Response<Body> {
        let token = self.csrf_token().await;
        self.post_form("/logout", &[("_csrf", &token)]).await
    }
}

/// A `session=...` cookie pair naming `username`, sealed under `secret`.
pub fn session_cookie_for(config: &ServerConfig, secret: &str, username: &str) -> String {
    let data = SessionData {
        user: Some(SessionUser {
            username: username.into(),
        }),
        ..Default::default()
    };
    let key = session_key(secret).unwrap();
    let now = chrono::Utc::now().timestamp();
    let jar = seal_session(&data, &key, config, now).unwrap();
    let response = (jar, ()).into_response();
    let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().trim().to_string()
}

// ---------------------------------------------------------------------------
// JSON helpers for the task API
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, None, Some(body)).await
}

/// Exchange credentials for a bearer token.
pub async fn api_token(app: Router, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/login",
        serde_json::json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_string(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a `303 See Other` to `target` and return nothing else.
pub fn assert_redirect(response: &Response<Body>, target: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(LOCATION).unwrap().to_str().unwrap(),
        target
    );
}

pub fn extract_csrf(html: &str) -> Option<String> {
    let marker = r#"name="_csrf" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

fn form_encode(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "----inkwell-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
