//! System clipboard and file drops as chat events

use anyhow::Result;
use arboard::Clipboard;
use image::ImageEncoder;
use std::path::{Path, PathBuf};

use crate::payload::{ChatEvent, DataCarrier, DataItem, HTML_MIME};

/// Read the system clipboard as a paste event.
///
/// Text that looks like markup is offered as `text/html` as well, the way
/// browsers expose content copied from a page. Images become a PNG item.
pub fn read_clipboard_event() -> Result<ChatEvent> {
    let mut clipboard = Clipboard::new()?;
    let mut carrier = DataCarrier::new();

    if let Ok(text) = clipboard.get_text() {
        if !text.is_empty() {
            if looks_like_html(&text) {
                carrier.set_data(HTML_MIME, text.clone());
            }
            carrier.set_data("text/plain", text.clone());
            carrier.push_item(DataItem::text("text/plain", text));
        }
    }

    if let Ok(img) = clipboard.get_image() {
        let png_data = encode_as_png(&img)?;
        carrier.push_item(DataItem::file("clipboard.png", "image/png", png_data));
    }

    Ok(ChatEvent::paste(carrier))
}

fn looks_like_html(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('<') && trimmed.contains('>')
}

/// Encode an arboard ImageData as PNG
fn encode_as_png(img: &arboard::ImageData) -> Result<Vec<u8>> {
    use image::{ImageBuffer, Rgba};

    // arboard gives us RGBA data
    let width = img.width as u32;
    let height = img.height as u32;

    let img_buffer: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(width, height, img.bytes.to_vec())
            .ok_or_else(|| anyhow::anyhow!("Failed to create image buffer"))?;

    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
    encoder.write_image(
        &img_buffer,
        width,
        height,
        image::ExtendedColorType::Rgba8,
    )?;

    Ok(png_data)
}

/// Build a drop event from file paths, one item per readable file
pub fn drop_event_from_paths(paths: &[PathBuf]) -> ChatEvent {
    let mut carrier = DataCarrier::new();
    for path in paths {
        if let Some(item) = load_item_from_path(path) {
            carrier.push_item(item);
        }
    }
    ChatEvent::dropped(carrier)
}

/// Read a file into a typed item, guessing the type from the extension
pub fn load_item_from_path(path: &Path) -> Option<DataItem> {
    if !path.is_file() {
        return None;
    }

    let mime_type = path
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_for_extension)
        .unwrap_or("application/octet-stream");

    let data = std::fs::read(path).ok()?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();

    Some(DataItem::file(filename, mime_type, data))
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// Resolve a dropped path as terminals paste it
pub fn parse_dropped_path(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim();

    // Skip if it looks like multiple lines
    if trimmed.contains('\n') {
        return None;
    }

    // Try different path formats:
    // 1. Direct path (may contain spaces)
    // 2. Quoted path
    // 3. Path with escaped spaces (backslash before space)
    let candidates = [
        trimmed.to_string(),
        trimmed.trim_matches('"').trim_matches('\'').to_string(),
        trimmed.replace("\\ ", " "),
    ];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}
