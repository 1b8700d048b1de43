//! Renders the image message markup.
//!
//! The output shape is fixed, existing chat styling targets it:
//!
//! ```text
//! <div class="{namespace}-container"><img src="{url}" alt="{namespace}"></div>
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MarkupError;

/// A character reference already present in the URL (`&amp;`, `&#38;`, `&#x26;`).
static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
        .expect("entity regex is valid")
});

/// Build the message content for an image URL.
pub fn build_image_markup(namespace: &str, url: &str) -> Result<String, MarkupError> {
    let src = escape_url_attribute(url)?;
    Ok(format!(
        r#"<div class="{ns}-container"><img src="{src}" alt="{ns}"></div>"#,
        ns = namespace,
        src = src
    ))
}

/// Make a URL safe to place inside a double-quoted attribute.
///
/// Quotes, angle brackets, whitespace and control characters are refused outright.
/// Bare ampersands are escaped; existing character references are left alone so
/// text that was already HTML-escaped is not escaped twice.
pub fn escape_url_attribute(url: &str) -> Result<String, MarkupError> {
    if url.trim().is_empty() {
        return Err(MarkupError::EmptyUrl);
    }

    if url
        .chars()
        .any(|c| matches!(c, '"' | '\'' | '<' | '>' | '`') || c.is_whitespace() || c.is_control())
    {
        return Err(MarkupError::UnsafeUrl(url.to_string()));
    }

    let mut escaped = String::with_capacity(url.len());
    for (idx, c) in url.char_indices() {
        if c == '&' && !ENTITY_REGEX.is_match(&url[idx..]) {
            escaped.push_str("&amp;");
        } else {
            escaped.push(c);
        }
    }

    Ok(escaped)
}
