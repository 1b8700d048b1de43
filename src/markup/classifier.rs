//! Recognizes chat text that is nothing but a link, and links that point at images.

use once_cell::sync::Lazy;
use regex::Regex;

/// One anchor tag wrapping a URL, with nothing around it.
static SOLE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^<a\b[^>]*>(\b(?:https?|ftp|file)://[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|])</a>$",
    )
    .expect("sole url regex is valid")
});

/// The same URL grammar without the anchor, for plain text typed by the user.
static BARE_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\b(?:https?|ftp|file)://[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|]$")
        .expect("bare url regex is valid")
});

/// Deliberately unanchored: `a.png?size=large` and `/a.png/raw` both count.
static IMAGE_EXTENSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\w+\.(?:jpg|jpeg|gif|png|tiff|bmp)").expect("image regex is valid")
});

/// Check if the whole message is a single anchor-wrapped URL
pub fn is_sole_url(text: &str) -> bool {
    SOLE_URL_REGEX.is_match(text)
}

/// Return the URL of a message that is a single anchor-wrapped URL
pub fn sole_url(text: &str) -> Option<&str> {
    SOLE_URL_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Check if a URL names an image file
pub fn has_image_extension(url: &str) -> bool {
    IMAGE_EXTENSION_REGEX.is_match(url)
}

/// Wrap plain text that is exactly one URL into the anchor form chat hosts produce.
///
/// Returns `None` when the trimmed text is not a bare URL.
pub fn anchorize(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if !BARE_URL_REGEX.is_match(trimmed) {
        return None;
    }

    let escaped = trimmed.replace('&', "&amp;");
    Some(format!(
        r#"<a class="hyperlink" href="{0}" target="_blank">{0}</a>"#,
        escaped
    ))
}
