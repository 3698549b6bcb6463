//! Server-side HTML rendering.
//!
//! Every page goes through [`layout`], which draws the navigation bar,
//! drains the session's flash messages and validation errors, and wraps
//! the page body. Anything user-supplied is escaped with [`escape`];
//! rendered wiki content is inserted as-is.

use std::fmt::Write as _;

use axum::http::StatusCode;
use inkwell_core::flash::FlashMessage;
use inkwell_core::wiki::page_path;
use inkwell_db::models::page::Page;
use inkwell_db::models::user::User;

use crate::csrf::CSRF_FIELD;
use crate::session::Session;

/// Per-request data every page needs.
#[derive(Debug, Default)]
pub struct PageContext {
    pub username: Option<String>,
    pub flash: Vec<FlashMessage>,
    pub errors: Vec<String>,
    pub csrf_token: String,
}

impl PageContext {
    /// Read identity and token from the session and consume its notices.
    pub async fn load(session: &Session) -> Self {
        let (flash, errors) = session.take_notices().await;
        Self {
            username: session.username().await,
            flash,
            errors,
            csrf_token: session.csrf_token().await,
        }
    }

    fn csrf_input(&self) -> String {
        format!(
            r#"<input type="hidden" name="{CSRF_FIELD}" value="{}">"#,
            escape(&self.csrf_token)
        )
    }
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(ctx: &PageContext, title: &str, body: &str) -> String {
    let mut nav = String::from(r#"<a href="/">Home</a> <a href="/wiki">Wiki</a>"#);
    match &ctx.username {
        Some(name) => {
            let _ = write!(
                nav,
                r#" <a href="/create">New page</a> <a href="/chat">Chat</a> <a href="/profile">{}</a>
<form class="inline" method="post" action="/logout">{}<button type="submit">Log out</button></form>"#,
                escape(name),
                ctx.csrf_input()
            );
        }
        None => nav.push_str(r#" <a href="/login">Log in</a> <a href="/register">Register</a>"#),
    }

    let mut notices = String::new();
    for msg in &ctx.flash {
        let _ = writeln!(
            notices,
            r#"<div class="alert alert-{}">{}</div>"#,
            msg.level.as_str(),
            escape(&msg.text)
        );
    }
    if !ctx.errors.is_empty() {
        notices.push_str(r#"<ul class="errors">"#);
        for err in &ctx.errors {
            let _ = write!(notices, "<li>{}</li>", escape(err));
        }
        notices.push_str("</ul>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Inkwell</title>
</head>
<body>
<nav>{nav}</nav>
<main>
{notices}{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn home(ctx: &PageContext, pages: &[Page]) -> String {
    let greeting = match &ctx.username {
        Some(name) => format!("<p>Hello, {}!</p>", escape(name)),
        None => "<p>Log in to write pages, upload an avatar and chat.</p>".to_string(),
    };
    let body = format!(
        "<h1>Inkwell</h1>\n{greeting}\n<p>The wiki has {} page(s). <a href=\"/wiki\">Browse them</a>.</p>",
        pages.len()
    );
    layout(ctx, "Home", &body)
}

pub fn register_form(ctx: &PageContext) -> String {
    let body = format!(
        r#"<h1>Register</h1>
<form method="post" action="/register">
{csrf}
<label>Username <input name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirm_password" required></label>
<button type="submit">Register</button>
</form>"#,
        csrf = ctx.csrf_input()
    );
    layout(ctx, "Register", &body)
}

pub fn login_form(ctx: &PageContext) -> String {
    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login">
{csrf}
<label>Username <input name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>"#,
        csrf = ctx.csrf_input()
    );
    layout(ctx, "Log in", &body)
}

pub fn wiki_index(ctx: &PageContext, pages: &[Page]) -> String {
    let mut body = String::from("<h1>All pages</h1>\n");
    if pages.is_empty() {
        body.push_str("<p>No pages yet.</p>");
    } else {
        body.push_str("<ul>\n");
        for page in pages {
            let _ = writeln!(
                body,
                r#"<li><a href="{}">{}</a></li>"#,
                escape(&page_path(&page.title)),
                escape(&page.title)
            );
        }
        body.push_str("</ul>");
    }
    layout(ctx, "Wiki", &body)
}

/// Render a stored page; `content_html` is the already-rendered body.
pub fn wiki_page(ctx: &PageContext, page: &Page, content_html: &str) -> String {
    let byline = match &page.author_name {
        Some(author) => format!(
            r#"<p class="byline">Written by {} on {}</p>"#,
            escape(author),
            page.created_at.format("%Y-%m-%d")
        ),
        None => String::new(),
    };
    let body = format!(
        "<h1>{}</h1>\n{byline}\n<article>\n{content_html}</article>",
        escape(&page.title)
    );
    layout(ctx, &page.title, &body)
}

pub fn create_form(ctx: &PageContext) -> String {
    let body = format!(
        r#"<h1>New page</h1>
<form method="post" action="/create">
{csrf}
<label>Title <input name="title" required></label>
<label>Format
<select name="format">
<option value="markdown" selected>Markdown</option>
<option value="html">HTML</option>
</select>
</label>
<label>Content <textarea name="content" rows="20"></textarea></label>
<button type="submit">Create</button>
</form>"#,
        csrf = ctx.csrf_input()
    );
    layout(ctx, "New page", &body)
}

pub fn profile(ctx: &PageContext, user: &User) -> String {
    let avatar = match &user.avatar {
        Some(file) => format!(
            r#"<img class="avatar" src="/uploads/{}" alt="Avatar of {}">"#,
            escape(file),
            escape(&user.username)
        ),
        None => r#"<p class="avatar-missing">No avatar yet.</p>"#.to_string(),
    };
    let csrf = ctx.csrf_input();
    let body = format!(
        r#"<h1>{name}</h1>
{avatar}
<h2>Avatar</h2>
<form method="post" action="/profile" enctype="multipart/form-data">
{csrf}
<input type="file" name="avatar" accept=".png,.jpg,.jpeg,.gif">
<button type="submit">Upload</button>
</form>
<h2>Change password</h2>
<form method="post" action="/profile/password">
{csrf}
<label>Current password <input type="password" name="current_password" required></label>
<label>New password <input type="password" name="new_password" required></label>
<label>Confirm new password <input type="password" name="confirm_password" required></label>
<button type="submit">Change password</button>
</form>"#,
        name = escape(&user.username),
    );
    layout(ctx, "Profile", &body)
}

pub fn chat(ctx: &PageContext) -> String {
    let body = r#"<h1>Chat</h1>
<ul id="messages"></ul>
<form id="chat-form"><input id="chat-input" autocomplete="off"><button>Send</button></form>
<script>
const proto = location.protocol === "https:" ? "wss" : "ws";
const socket = new WebSocket(`${proto}://${location.host}/chat/ws`);
const list = document.getElementById("messages");
socket.addEventListener("message", (event) => {
  const msg = JSON.parse(event.data);
  const item = document.createElement("li");
  item.textContent = `${msg.username}: ${msg.text}`;
  list.appendChild(item);
});
document.getElementById("chat-form").addEventListener("submit", (event) => {
  event.preventDefault();
  const input = document.getElementById("chat-input");
  if (input.value) { socket.send(input.value); input.value = ""; }
});
</script>"#;
    layout(ctx, "Chat", body)
}

pub fn not_found(ctx: &PageContext) -> String {
    layout(
        ctx,
        "Page not found",
        r#"<h1>Page not found</h1>
<p>We could not find what you were looking for. <a href="/">Go home</a>.</p>"#,
    )
}

/// Standalone error page, rendered without session context.
pub fn error_page(status: StatusCode, title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p class=\"status\">{}</p>\n<p><a href=\"/\">Go home</a></p>",
        escape(title),
        escape(message),
        status.as_u16()
    );
    layout(&PageContext::default(), title, &body)
}
