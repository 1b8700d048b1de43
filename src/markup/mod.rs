//! Image message markup
//!
//! - `classifier` - recognizes sole-URL messages and image URLs
//! - `builder` - renders the image message content

mod builder;
mod classifier;

#[allow(unused_imports)]
pub use builder::{build_image_markup, escape_url_attribute};
#[allow(unused_imports)]
pub use classifier::{anchorize, has_image_extension, is_sole_url, sole_url};

/// Namespace for generated markup: CSS classes and alt text derive from it.
pub const MODULE_NAME: &str = "chat-images";

/// Rewrite a message that is a sole image URL into image markup.
///
/// Returns `None` when the text is not a sole URL. A sole URL that does not
/// point at an image comes back unchanged, so callers can still tell it apart
/// from ordinary text.
pub fn convert_text_to_image(text: &str) -> Option<String> {
    convert_text_to_image_in(MODULE_NAME, text)
}

/// Same as [`convert_text_to_image`] with an explicit namespace.
pub fn convert_text_to_image_in(namespace: &str, text: &str) -> Option<String> {
    let url = sole_url(text)?;

    if !has_image_extension(url) {
        return Some(text.to_string());
    }

    Some(build_image_markup(namespace, url).unwrap_or_else(|_| text.to_string()))
}
