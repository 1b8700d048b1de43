//! Native desktop notification support.
//!
//! Failed sends are surfaced to the user with a system notification:
//! - Message creation failures (rejected or timed out)
//! - Compression failures
//! - Unsafe image URLs and viewer errors

use std::sync::Mutex;
use std::time::Instant;

use notify_rust::{Notification, Timeout};
use serde::Deserialize;

use crate::chat::ErrorReporter;
use crate::error::ChatImagesError;

/// Types of notifications that can be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// The message API rejected or timed out
    SendFailed,
    /// The image could not be compressed
    CompressionFailed,
    /// Anything else
    Error,
}

impl NotificationType {
    pub fn for_error(error: &ChatImagesError) -> Self {
        match error {
            ChatImagesError::Send(_) => NotificationType::SendFailed,
            ChatImagesError::Compression(_) => NotificationType::CompressionFailed,
            _ => NotificationType::Error,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationType::SendFailed => "Image Not Sent",
            NotificationType::CompressionFailed => "Image Compression Failed",
            NotificationType::Error => "Chat Images",
        }
    }
}

/// Configuration for notifications.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Whether notifications are enabled
    pub enabled: bool,
    /// Minimum seconds between same notification type (prevents spam)
    pub dedupe_interval_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dedupe_interval_secs: 30,
        }
    }
}

/// Manages sending desktop notifications with deduplication.
pub struct NotificationManager {
    config: NotificationConfig,
    last_notification: Mutex<Option<(NotificationType, Instant)>>,
}

impl NotificationManager {
    /// Create a new notification manager with the given configuration.
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            last_notification: Mutex::new(None),
        }
    }

    /// Send a notification if enabled and not a duplicate.
    ///
    /// Returns `true` if the notification was sent.
    pub fn send(&self, ntype: NotificationType, body: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        if self.is_duplicate(ntype) {
            return false;
        }

        let result = Notification::new()
            .summary(ntype.title())
            .body(body)
            .timeout(Timeout::Milliseconds(5000))
            .show();

        if result.is_ok() {
            if let Ok(mut last) = self.last_notification.lock() {
                *last = Some((ntype, Instant::now()));
            }
            true
        } else {
            false
        }
    }

    /// Check if this notification type was recently sent.
    fn is_duplicate(&self, ntype: NotificationType) -> bool {
        self.last_notification
            .lock()
            .ok()
            .and_then(|last| *last)
            .map(|(t, when)| {
                t == ntype && when.elapsed().as_secs() < self.config.dedupe_interval_secs
            })
            .unwrap_or(false)
    }
}

impl ErrorReporter for NotificationManager {
    fn report(&self, error: &ChatImagesError) {
        if !self.send(NotificationType::for_error(error), &error.to_string()) {
            eprintln!("{}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompressionError, SendError};

    #[test]
    fn test_disabled_notifications() {
        let config = NotificationConfig {
            enabled: false,
            ..Default::default()
        };
        let manager = NotificationManager::new(config);

        assert!(!manager.send(NotificationType::SendFailed, "Body"));
    }

    #[test]
    fn test_default_config() {
        let config = NotificationConfig::default();
        assert!(config.enabled);
        assert_eq!(config.dedupe_interval_secs, 30);
    }

    #[test]
    fn test_recent_same_type_is_duplicate() {
        let manager = NotificationManager::new(NotificationConfig::default());
        *manager.last_notification.lock().unwrap() =
            Some((NotificationType::SendFailed, Instant::now()));

        assert!(manager.is_duplicate(NotificationType::SendFailed));
        assert!(!manager.is_duplicate(NotificationType::CompressionFailed));
    }

    #[test]
    fn test_type_for_error() {
        assert_eq!(
            NotificationType::for_error(&SendError::Unavailable.into()),
            NotificationType::SendFailed
        );
        assert_eq!(
            NotificationType::for_error(&CompressionError::Decode("x".into()).into()),
            NotificationType::CompressionFailed
        );
        assert_eq!(
            NotificationType::for_error(&"other".into()),
            NotificationType::Error
        );
    }
}
