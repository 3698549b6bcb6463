//! Registration, login and logout for the HTML site.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Redirect};
use axum::Form;
use inkwell_core::flash::FlashMessage;
use inkwell_core::validation::{check_registration, NewCredentials};
use inkwell_db::models::user::CreateUser;
use inkwell_db::StoreError;
use serde::Deserialize;

use crate::auth::password::{hash_password, verify_password};
use crate::csrf;
use crate::error::{PageError, PageResult};
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, PageContext};

/// Form body for `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// Form body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// Form body for `POST /logout`.
#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// GET /register
pub async fn show_register(session: Session) -> Html<String> {
    let ctx = PageContext::load(&session).await;
    Html(views::register_form(&ctx))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> PageResult<Redirect> {
    csrf::verify(&session, &headers, &form.csrf).await?;

    let creds = NewCredentials {
        username: form.username,
        password: form.password,
    };
    let errors = check_registration(&creds, &form.confirm_password);
    if !errors.is_empty() {
        session.set_errors(errors).await;
        return Ok(Redirect::to("/register"));
    }

    let password_hash = hash_password(&creds.password)
        .map_err(|e| PageError::Internal(format!("Password hashing error: {e}")))?;

    let input = CreateUser {
        username: creds.username,
        password_hash,
    };
    match state.store.create_user(&input).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "User registered");
            session
                .flash(FlashMessage::success("Registration successful. Please log in."))
                .await;
            Ok(Redirect::to("/login"))
        }
        Err(StoreError::Duplicate { .. }) => {
            tracing::info!(username = %input.username, "Registration with taken username");
            session
                .flash(FlashMessage::danger("Username is already taken."))
                .await;
            Ok(Redirect::to("/register"))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn show_login(session: Session) -> Html<String> {
    let ctx = PageContext::load(&session).await;
    Html(views::login_form(&ctx))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> PageResult<Redirect> {
    csrf::verify(&session, &headers, &form.csrf).await?;

    let user = state.store.find_user_by_username(&form.username).await?;
    let authenticated = match &user {
        Some(user) => verify_password(&form.password, &user.password_hash)
            .map_err(|e| PageError::Internal(format!("Password verification error: {e}")))?,
        None => false,
    };

    match user {
        Some(user) if authenticated => {
            session.login(&user.username).await;
            session
                .flash(FlashMessage::success(format!(
                    "Welcome back, {}!",
                    user.username
                )))
                .await;
            tracing::info!(user_id = user.id, username = %user.username, "User logged in");
            Ok(Redirect::to("/"))
        }
        _ => {
            tracing::info!(username = %form.username, "Failed login attempt");
            session
                .flash(FlashMessage::danger("Invalid username or password."))
                .await;
            Ok(Redirect::to("/login"))
        }
    }
}

/// POST /logout
pub async fn logout(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LogoutForm>,
) -> PageResult<Redirect> {
    csrf::verify(&session, &headers, &form.csrf).await?;

    let username = session.username().await;
    session.destroy().await;
    session
        .flash(FlashMessage::info("You have been logged out."))
        .await;
    if let Some(username) = username {
        tracing::info!(%username, "User logged out");
    }
    Ok(Redirect::to("/"))
}
