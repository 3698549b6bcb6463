//! Creating and reading wiki pages.

mod common;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use common::{assert_redirect, body_string, Browser};
use inkwell_db::Store;

async fn logged_in(app: &common::TestApp) -> Browser {
    app.create_user("ada", "analytical-engine").await;
    let mut browser = app.browser();
    browser.log_in("ada", "analytical-engine").await;
    browser
}

async fn create_page(
    browser: &mut Browser,
    title: &str,
    content: &str,
    format: &str,
) -> Response<Body> {
    let token = browser.csrf_token().await;
    browser
        .post_form(
            "/create",
            &[
                ("title", title),
                ("content", content),
                ("format", format),
                ("_csrf", &token),
            ],
        )
        .await
}

#[tokio::test]
async fn created_markdown_page_is_rendered() {
    let app = common::build_test_app();
    let mut browser = logged_in(&app).await;

    let response = create_page(
        &mut browser,
        "  Rust Tips ",
        "# Hello\n\nSome *emphasis* and ~~gone~~.",
        "markdown",
    )
    .await;
    assert_redirect(&response, "/wiki/Rust%20Tips");

    let response = browser.get("/wiki/Rust%20Tips").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Page &quot;Rust Tips&quot; created."));
    assert!(html.contains("<h1>Hello</h1>\n<p>Some <em>emphasis</em> and <del>gone</del>.</p>"));
    assert!(html.contains("Written by ada"));

    let page = app.store.find_page_by_title("Rust Tips").await.unwrap().unwrap();
    assert!(page.is_markdown);
    assert_eq!(page.author_name.as_deref(), Some("ada"));
}

#[tokio::test]
async fn html_page_is_shown_verbatim() {
    let app = common::build_test_app();
    let mut browser = logged_in(&app).await;

    let content = "<p>Made in an <strong>editor</strong> # not a heading</p>";
    let response = create_page(&mut browser, "Editor", content, "html").await;
    assert_redirect(&response, "/wiki/Editor");

    let html = browser.page("/wiki/Editor").await;
    assert!(html.contains(content));
}

#[tokio::test]
async fn duplicate_title_is_rejected() {
    let app = common::build_test_app();
    let mut browser = logged_in(&app).await;

    create_page(&mut browser, "Home", "first", "markdown").await;
    let response = create_page(&mut browser, "Home", "second", "markdown").await;
    assert_redirect(&response, "/create");

    let html = browser.page("/create").await;
    assert!(html.contains("Could not create the page. A page with that title may already exist."));
    let page = app.store.find_page_by_title("Home").await.unwrap().unwrap();
    assert_eq!(page.content, "first");
}

#[tokio::test]
async fn invalid_title_shows_errors() {
    let app = common::build_test_app();
    let mut browser = logged_in(&app).await;

    let response = create_page(&mut browser, "a/b", "content", "markdown").await;
    assert_redirect(&response, "/create");
    let html = browser.page("/create").await;
    assert!(html.contains("Title must not contain &#39;/&#39;."));

    let response = create_page(&mut browser, "   ", "content", "rtf").await;
    assert_redirect(&response, "/create");
    let html = browser.page("/create").await;
    assert!(html.contains("Title must not be empty."));
    assert!(html.contains("Unknown page format"));

    assert!(app.store.list_pages().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_page_is_404() {
    let app = common::build_test_app();
    let mut browser = app.browser();

    let response = browser.get("/wiki/Nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Page not found"));
}

#[tokio::test]
async fn index_lists_titles_alphabetically() {
    let app = common::build_test_app();
    let mut browser = logged_in(&app).await;

    for title in ["Zebra", "Apple", "Mango"] {
        create_page(&mut browser, title, "text", "markdown").await;
    }

    let html = browser.page("/wiki").await;
    let apple = html.find(">Apple<").unwrap();
    let mango = html.find(">Mango<").unwrap();
    let zebra = html.find(">Zebra<").unwrap();
    assert!(apple < mango && mango < zebra);
    assert!(html.contains(r#"href="/wiki/Apple""#));

    let home = browser.page("/").await;
    assert!(home.contains("3 page(s)"));
}
