//! Lossy re-encoding of pasted or dropped image files.
//!
//! Compression decodes the source (any format the chat recognizes), drops the
//! alpha channel and re-encodes it as JPEG. When re-encoding does not shrink
//! the file the source comes back untouched.

use image::ImageEncoder;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::error::{CompressionError, CompressionResult};
use crate::payload::BinaryFile;

const COMPRESSED_MIME: &str = "image/jpeg";
const COMPRESSED_EXTENSION: &str = ".jpg";

/// Compress an image file at the given quality.
///
/// `quality` must be in (0, 1]; 1 keeps the most detail. The work runs on a
/// blocking worker so the caller's task only suspends at the await.
pub async fn compress(file: BinaryFile, quality: f32) -> CompressionResult<BinaryFile> {
    let jpeg_quality = jpeg_quality(quality)?;

    tokio::task::spawn_blocking(move || compress_blocking(file, jpeg_quality))
        .await
        .map_err(|e| CompressionError::Aborted(e.to_string()))?
}

/// Map a (0, 1] quality onto the encoder's 1..=100 scale
fn jpeg_quality(quality: f32) -> CompressionResult<u8> {
    if !quality.is_finite() || quality <= 0.0 || quality > 1.0 {
        return Err(CompressionError::InvalidQuality(quality));
    }
    Ok(((quality * 100.0).round() as u8).max(1))
}

fn compress_blocking(file: BinaryFile, jpeg_quality: u8) -> CompressionResult<BinaryFile> {
    let decoded =
        image::load_from_memory(&file.data).map_err(|e| CompressionError::Decode(e.to_string()))?;
    let rgb = decoded.to_rgb8();

    let mut jpeg_data = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_data, jpeg_quality);
    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CompressionError::Encode(e.to_string()))?;

    if jpeg_data.len() >= file.data.len() {
        return Ok(file);
    }

    let stem_source = format!("image{}", COMPRESSED_EXTENSION);
    Ok(BinaryFile::new(
        random_file_name(&stem_source),
        COMPRESSED_MIME,
        jpeg_data,
    ))
}

/// The extension of a file name, dot included
pub fn file_extension(file_name: &str) -> Option<&str> {
    let idx = file_name.rfind('.')?;
    let ext = &file_name[idx..];
    if ext.len() > 1 { Some(ext) } else { None }
}

/// A random file name that keeps the original extension.
///
/// Names without an extension are returned unchanged.
pub fn random_file_name(file_name: &str) -> String {
    match file_extension(file_name) {
        Some(ext) => format!("{}{}", random_string(26), ext),
        None => file_name.to_string(),
    }
}

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    /// A noisy RGBA PNG, large enough that JPEG wins
    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            let v = ((x * 31 + y * 17) ^ (x * y)) as u8;
            Rgba([v, v.wrapping_mul(3), v.wrapping_add(91), 255])
        });

        let mut png_data = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_data)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        png_data
    }

    #[test]
    fn test_quality_bounds() {
        assert_eq!(jpeg_quality(1.0), Ok(100));
        assert_eq!(jpeg_quality(0.8), Ok(80));
        assert_eq!(jpeg_quality(0.001), Ok(1));
        assert_eq!(jpeg_quality(0.0), Err(CompressionError::InvalidQuality(0.0)));
        assert_eq!(jpeg_quality(1.5), Err(CompressionError::InvalidQuality(1.5)));
        assert!(jpeg_quality(f32::NAN).is_err());
    }

    #[tokio::test]
    async fn test_compress_png_to_jpeg() {
        let source = BinaryFile::new("shot.png", "image/png", sample_png(256, 256));
        let source_len = source.len();

        let compressed = compress(source, 0.5).await.unwrap();

        assert_eq!(compressed.mime_type, "image/jpeg");
        assert!(compressed.name.ends_with(".jpg"));
        assert!(compressed.len() < source_len);
        assert!(image::load_from_memory(&compressed.data).is_ok());
    }

    #[tokio::test]
    async fn test_compress_rejects_garbage() {
        let source = BinaryFile::new("x.png", "image/png", vec![1, 2, 3, 4]);
        assert!(matches!(
            compress(source, 0.8).await,
            Err(CompressionError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_compress_rejects_invalid_quality() {
        let source = BinaryFile::new("x.png", "image/png", sample_png(4, 4));
        assert_eq!(
            compress(source, 0.0).await,
            Err(CompressionError::InvalidQuality(0.0))
        );
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.final.PNG"), Some(".PNG"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_random_file_name_keeps_extension() {
        let a = random_file_name("cat.gif");
        let b = random_file_name("cat.gif");
        assert!(a.ends_with(".gif"));
        assert_eq!(a.len(), 26 + 4);
        assert_ne!(a, b);
        assert_eq!(random_file_name("noext"), "noext");
    }
}
