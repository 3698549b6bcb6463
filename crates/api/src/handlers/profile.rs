//! The logged-in user's profile: avatar upload and password change.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use inkwell_core::flash::FlashMessage;
use inkwell_core::upload::{avatar_extension, stored_avatar_name, REJECTED_FILE_MESSAGE};
use inkwell_core::validation::check_new_password;
use serde::Deserialize;

use crate::auth::password::{hash_password, verify_password};
use crate::csrf::{self, CSRF_FIELD};
use crate::error::{PageError, PageResult};
use crate::handlers::session_user;
use crate::middleware::guard::RequireLogin;
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, PageContext};

/// Multipart field carrying the image.
pub const AVATAR_FIELD: &str = "avatar";

const NO_FILE_MESSAGE: &str = "Please choose a file to upload.";

/// Form body for `POST /profile/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// An uploaded file held in memory until it passes validation.
struct UploadedFile {
    file_name: String,
    bytes: axum::body::Bytes,
}

/// GET /profile
pub async fn show(
    RequireLogin(username): RequireLogin,
    State(state): State<AppState>,
    session: Session,
) -> PageResult<Response> {
    let Some(user) = session_user(&state, &session, &username).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    let ctx = PageContext::load(&session).await;
    Ok(Html(views::profile(&ctx, &user)).into_response())
}

/// POST /profile
///
/// Replaces the avatar. The stored avatar only changes once the new file
/// has passed every check and been written to disk.
pub async fn upload_avatar(
    RequireLogin(username): RequireLogin,
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> PageResult<Response> {
    let mut csrf_token = String::new();
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(reject)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            CSRF_FIELD => csrf_token = field.text().await.map_err(reject)?,
            AVATAR_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(reject)?;
                upload = Some(UploadedFile { file_name, bytes });
            }
            _ => {}
        }
    }

    csrf::verify(&session, &headers, &csrf_token).await?;

    let Some(file) = upload.filter(|f| !f.file_name.is_empty()) else {
        session.flash(FlashMessage::danger(NO_FILE_MESSAGE)).await;
        return Ok(Redirect::to("/profile").into_response());
    };

    let extension = match avatar_extension(&file.file_name) {
        Ok(ext) => ext,
        Err(_) => {
            tracing::info!(%username, file_name = %file.file_name, "Rejected avatar upload");
            session
                .flash(FlashMessage::danger(REJECTED_FILE_MESSAGE))
                .await;
            return Ok(Redirect::to("/profile").into_response());
        }
    };

    if file.bytes.is_empty() {
        session.flash(FlashMessage::danger(NO_FILE_MESSAGE)).await;
        return Ok(Redirect::to("/profile").into_response());
    }

    let Some(user) = session_user(&state, &session, &username).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| PageError::Internal(format!("Failed to create upload dir: {e}")))?;

    let stored_name = stored_avatar_name(extension);
    let dest = upload_dir.join(&stored_name);
    tokio::fs::write(&dest, &file.bytes)
        .await
        .map_err(|e| PageError::Internal(format!("Failed to write avatar: {e}")))?;

    if !state.store.set_avatar(user.id, &stored_name).await? {
        remove_quietly(&dest).await;
        return Err(PageError::Internal(format!(
            "User {} vanished during avatar upload",
            user.id
        )));
    }

    if let Some(previous) = user.avatar.as_deref() {
        remove_quietly(&upload_dir.join(previous)).await;
    }

    tracing::info!(
        user_id = user.id,
        avatar = %stored_name,
        size = file.bytes.len(),
        "Avatar updated"
    );
    session.flash(FlashMessage::success("Avatar updated.")).await;
    Ok(Redirect::to("/profile").into_response())
}

/// POST /profile/password
pub async fn change_password(
    RequireLogin(username): RequireLogin,
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ChangePasswordForm>,
) -> PageResult<Response> {
    csrf::verify(&session, &headers, &form.csrf).await?;

    let Some(user) = session_user(&state, &session, &username).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let current_ok = verify_password(&form.current_password, &user.password_hash)
        .map_err(|e| PageError::Internal(format!("Password verification error: {e}")))?;
    if !current_ok {
        session
            .flash(FlashMessage::danger("Current password is incorrect."))
            .await;
        return Ok(Redirect::to("/profile").into_response());
    }

    let errors = check_new_password(&form.new_password, &form.confirm_password);
    if !errors.is_empty() {
        session.set_errors(errors).await;
        return Ok(Redirect::to("/profile").into_response());
    }

    let hash = hash_password(&form.new_password)
        .map_err(|e| PageError::Internal(format!("Password hashing error: {e}")))?;
    state.store.set_password_hash(user.id, &hash).await?;

    tracing::info!(user_id = user.id, "Password changed");
    session.flash(FlashMessage::success("Password changed.")).await;
    Ok(Redirect::to("/profile").into_response())
}

fn reject(err: axum::extract::multipart::MultipartError) -> PageError {
    tracing::info!(error = %err, "Unreadable multipart body");
    PageError::Rejected {
        status: err.status(),
        message: err.body_text(),
    }
}

/// Best-effort removal of a file that is no longer referenced.
async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove file");
    }
}
