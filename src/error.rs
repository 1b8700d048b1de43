//! Domain error types for chat-images
//!
//! Provides structured error types for different domains:
//! - `MarkupError` for unsafe or empty image URLs
//! - `CompressionError` for the image compressor
//! - `SendError` for the outgoing message API
//! - `ChatImagesError` as the top-level error type

use thiserror::Error;

/// Top-level error type for chat-images
#[derive(Debug, Error)]
pub enum ChatImagesError {
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("Compression error: {0}")]
    Compression(#[from] CompressionError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Popout error: {0}")]
    Popout(String),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while embedding a URL into message markup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("Image URL is empty")]
    EmptyUrl,

    #[error("Image URL contains characters that cannot be embedded: {0}")]
    UnsafeUrl(String),
}

/// Errors raised by the image compressor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompressionError {
    #[error("Quality must be in (0, 1], got {0}")]
    InvalidQuality(f32),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Compression task aborted: {0}")]
    Aborted(String),
}

/// Errors raised by the outgoing message API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Message rejected: {0}")]
    Rejected(String),

    #[error("Message creation timed out after {0}ms")]
    Timeout(u64),

    #[error("Messaging service unavailable")]
    Unavailable,
}

/// Result type alias for ChatImagesError
pub type Result<T> = std::result::Result<T, ChatImagesError>;

/// Result type alias for CompressionError
pub type CompressionResult<T> = std::result::Result<T, CompressionError>;

/// Result type alias for SendError
pub type SendResult<T> = std::result::Result<T, SendError>;

impl From<anyhow::Error> for ChatImagesError {
    fn from(err: anyhow::Error) -> Self {
        ChatImagesError::Other(err.to_string())
    }
}

impl From<String> for ChatImagesError {
    fn from(msg: String) -> Self {
        ChatImagesError::Other(msg)
    }
}

impl From<&str> for ChatImagesError {
    fn from(msg: &str) -> Self {
        ChatImagesError::Other(msg.to_string())
    }
}
