//! Finds the image carried by a paste or drop.
//!
//! Content copied from a web page arrives with an HTML fragment that already
//! points at a hosted image; that URL is preferred over the raw bytes so the
//! image is not duplicated. Raw file items are the fallback, e.g. for files
//! dragged from the local filesystem.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{ChatEvent, DataCarrier, HTML_MIME, ImageReference};

static COMMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));

/// An `<img>` start tag; quoted attribute values may contain `>`.
static IMG_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<img\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("img tag regex is valid")
});

/// One `name`, `name=value`, `name="value"` or `name='value'` attribute.
static ATTRIBUTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute regex is valid")
});

const IMG_TAG_OPEN_LEN: usize = "<img".len();

static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9a-fA-F]+)|([A-Za-z]+));").expect("entity regex is valid")
});

/// Return the image from a paste/drop event, URL first, file second.
///
/// Never mutates the event; `None` means the event carries no image.
pub fn extract_image(event: &ChatEvent) -> Option<ImageReference> {
    let carrier = event.carrier()?;

    extract_url(carrier)
        .map(ImageReference::Url)
        .or_else(|| extract_file(carrier).map(ImageReference::File))
}

fn extract_url(carrier: &DataCarrier) -> Option<String> {
    first_image_src(carrier.get_data(HTML_MIME)?)
}

fn extract_file(carrier: &DataCarrier) -> Option<super::BinaryFile> {
    carrier
        .items()
        .iter()
        .find(|item| item.is_image())
        .map(|item| item.to_binary_file())
}

/// Source of the first `<img>` in an HTML fragment.
///
/// Only the first image element is considered; if it has no usable source
/// the fragment yields nothing.
pub fn first_image_src(html: &str) -> Option<String> {
    let html = COMMENT_REGEX.replace_all(html, "");
    let tag = IMG_TAG_REGEX.find(&html)?;
    src_of(tag.as_str())
}

/// Sources of every `<img>` in an HTML fragment, in document order.
pub fn img_sources(html: &str) -> Vec<String> {
    let html = COMMENT_REGEX.replace_all(html, "");
    IMG_TAG_REGEX
        .find_iter(&html)
        .filter_map(|tag| src_of(tag.as_str()))
        .collect()
}

/// Value of the `src` attribute of an `<img>` start tag.
///
/// Attributes are walked in order so text inside other attribute values is
/// never mistaken for a source; the first `src` wins, as in HTML parsing.
fn src_of(tag: &str) -> Option<String> {
    let attributes = tag.get(IMG_TAG_OPEN_LEN..)?;
    let caps = ATTRIBUTE_REGEX
        .captures_iter(attributes)
        .find(|caps| caps[1].eq_ignore_ascii_case("src"))?;
    let raw = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
    let src = decode_entities(raw.as_str().trim());

    if src.is_empty() { None } else { Some(src) }
}

fn decode_entities(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("amp") => Some('&'),
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("nbsp") => Some('\u{a0}'),
                    _ => None,
                }
            };

            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
