//! Handlers for the JSON task API under `/api`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use inkwell_core::error::CoreError;
use inkwell_core::types::DbId;
use inkwell_db::models::task::{CreateTask, Task};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted task title, in characters.
const MAX_TASK_TITLE_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/login`.
#[derive(Debug, Deserialize)]
pub struct ApiLoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful token response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// Request body for `POST /api/tasks`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/login
///
/// Exchange username + password for a bearer token.
pub async fn api_login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ApiLoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid username or password".into()));

    let user = state
        .store
        .find_user_by_username(&input.username)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(username = %input.username, "Failed API login attempt");
        return Err(invalid());
    }

    let token = generate_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, username = %user.username, "Issued API token");
    Ok(Json(TokenResponse {
        token,
        expires_in: state.config.jwt.expires_in_secs(),
    }))
}

/// GET /api/tasks
pub async fn list_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = state.store.list_tasks(auth.user_id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/tasks
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Task title must not be empty".into(),
        )));
    }
    if title.chars().count() > MAX_TASK_TITLE_CHARS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Task title must be at most {MAX_TASK_TITLE_CHARS} characters"
        ))));
    }

    let task = state
        .store
        .create_task(&CreateTask {
            owner_id: auth.user_id,
            title: title.to_string(),
        })
        .await?;

    tracing::info!(task_id = task.id, user_id = auth.user_id, "Task created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// DELETE /api/tasks/{id}
///
/// Tasks owned by someone else are reported as missing.
pub async fn delete_task(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiPath(task_id): ApiPath<DbId>,
) -> AppResult<StatusCode> {
    if !state.store.delete_task(auth.user_id, task_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Task",
            key: task_id.to_string(),
        }));
    }
    tracing::info!(task_id, user_id = auth.user_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
