//! Wiki pages: listing, display and creation.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use inkwell_core::error::CoreError;
use inkwell_core::flash::FlashMessage;
use inkwell_core::wiki::{self, PageFormat};
use inkwell_db::models::page::CreatePage;
use inkwell_db::StoreError;
use serde::Deserialize;

use crate::csrf;
use crate::error::{PageError, PageResult};
use crate::handlers::session_user;
use crate::middleware::guard::RequireLogin;
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, PageContext};

/// Shown for duplicate titles and for any other failed insert.
const CREATE_FAILED_MESSAGE: &str =
    "Could not create the page. A page with that title may already exist.";

/// Form body for `POST /create`.
#[derive(Debug, Deserialize)]
pub struct CreatePageForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub format: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

/// GET /
pub async fn home(State(state): State<AppState>, session: Session) -> PageResult<Html<String>> {
    let pages = state.store.list_pages().await?;
    let ctx = PageContext::load(&session).await;
    Ok(Html(views::home(&ctx, &pages)))
}

/// GET /wiki
pub async fn index(State(state): State<AppState>, session: Session) -> PageResult<Html<String>> {
    let pages = state.store.list_pages().await?;
    let ctx = PageContext::load(&session).await;
    Ok(Html(views::wiki_index(&ctx, &pages)))
}

/// GET /wiki/{page_name}
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(page_name): Path<String>,
) -> PageResult<Html<String>> {
    let page = state
        .store
        .find_page_by_title(&page_name)
        .await?
        .ok_or(PageError::NotFound)?;

    let body = wiki::render_content(&page.content, page.is_markdown);
    let ctx = PageContext::load(&session).await;
    Ok(Html(views::wiki_page(&ctx, &page, &body)))
}

/// GET /create
pub async fn show_create(RequireLogin(_): RequireLogin, session: Session) -> Html<String> {
    let ctx = PageContext::load(&session).await;
    Html(views::create_form(&ctx))
}

/// POST /create
pub async fn create(
    RequireLogin(username): RequireLogin,
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CreatePageForm>,
) -> PageResult<Response> {
    csrf::verify(&session, &headers, &form.csrf).await?;

    let title = form.title.trim().to_string();
    let mut errors = Vec::new();
    if let Err(e) = wiki::validate_title(&title) {
        errors.push(validation_message(e));
    }
    if let Err(e) = wiki::validate_content(&form.content) {
        errors.push(validation_message(e));
    }
    let format = match PageFormat::parse(&form.format) {
        Ok(format) => Some(format),
        Err(e) => {
            errors.push(validation_message(e));
            None
        }
    };
    let Some(format) = format.filter(|_| errors.is_empty()) else {
        session.set_errors(errors).await;
        return Ok(Redirect::to("/create").into_response());
    };

    let Some(author) = session_user(&state, &session, &username).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let input = CreatePage {
        title,
        content: form.content,
        author_id: Some(author.id),
        is_markdown: format.is_markdown(),
    };

    match state.store.create_page(&input).await {
        Ok(page) => {
            tracing::info!(page_id = page.id, title = %page.title, %username, "Page created");
            session
                .flash(FlashMessage::success(format!("Page \"{}\" created.", page.title)))
                .await;
            Ok(Redirect::to(&wiki::page_path(&page.title)).into_response())
        }
        Err(e) => {
            match &e {
                StoreError::Duplicate { .. } => {
                    tracing::info!(title = %input.title, "Page title already taken");
                }
                other => tracing::error!(error = %other, title = %input.title, "Failed to create page"),
            }
            session.flash(FlashMessage::danger(CREATE_FAILED_MESSAGE)).await;
            Ok(Redirect::to("/create").into_response())
        }
    }
}

/// The bare sentence of a validation failure, for display under the form.
fn validation_message(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg,
        other => other.to_string(),
    }
}
