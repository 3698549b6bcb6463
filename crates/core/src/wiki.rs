//! Wiki page validation, content rendering and URL helpers.
//!
//! This module lives in `core` (zero internal deps) so both the store and
//! the HTTP layer agree on what a valid page looks like.

use pulldown_cmark::{html, Options, Parser};

use crate::error::CoreError;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum content length in characters.
pub const MAX_CONTENT_CHARS: usize = 100_000;

// ---------------------------------------------------------------------------
// Page format
// ---------------------------------------------------------------------------

/// How the submitted content should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    /// Markdown source, converted to HTML on display.
    Markdown,
    /// HTML produced by a WYSIWYG editor, displayed as stored.
    Html,
}

impl PageFormat {
    /// Parse the `format` form field. An empty value means Markdown.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim() {
            "" | "markdown" => Ok(PageFormat::Markdown),
            "html" => Ok(PageFormat::Html),
            other => Err(CoreError::Validation(format!(
                "Unknown page format '{other}'. Use 'markdown' or 'html'."
            ))),
        }
    }

    pub fn is_markdown(self) -> bool {
        self == PageFormat::Markdown
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a page title (already trimmed).
///
/// Titles are the page key and appear as a single URL path segment, so
/// they must be non-empty, at most [`MAX_TITLE_CHARS`] characters and free
/// of `/`. Titles made only of dots would be read as `.` or `..` segments.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.is_empty() {
        return Err(CoreError::Validation("Title must not be empty.".into()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters."
        )));
    }
    if title.contains('/') {
        return Err(CoreError::Validation(
            "Title must not contain '/'.".into(),
        ));
    }
    if title.chars().all(|c| c == '.') {
        return Err(CoreError::Validation(
            "Title must not consist only of dots.".into(),
        ));
    }
    Ok(())
}

/// Validate page content (at most [`MAX_CONTENT_CHARS`]).
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(CoreError::Validation(format!(
            "Content must be at most {MAX_CONTENT_CHARS} characters."
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Convert Markdown source to HTML.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Produce the HTML body for a stored page.
pub fn render_content(content: &str, is_markdown: bool) -> String {
    if is_markdown {
        render_markdown(content)
    } else {
        content.to_string()
    }
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

/// Build the `/wiki/{title}` path, percent-encoding the title.
pub fn page_path(title: &str) -> String {
    let mut path = String::from("/wiki/");
    for byte in title.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            path.push(byte as char);
        } else {
            path.push_str(&format!("%{byte:02X}"));
        }
    }
    path
}
