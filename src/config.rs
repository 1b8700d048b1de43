//! Configuration file support for chat-images.
//!
//! Configuration is loaded from `~/.config/chat-images/config.toml` with the following precedence:
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.config/chat-images/config.toml
//! debug = true
//! trace = false
//! require_confirmation = true
//! compress_files = true
//! compression_quality = 0.7
//! send_timeout_ms = 15000
//!
//! [notifications]
//! enabled = true
//! dedupe_interval_secs = 10
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::chat::SendSettings;
use crate::markup::MODULE_NAME;
use crate::notification::NotificationConfig;

const DEFAULT_QUALITY: f32 = 0.8;
const DEFAULT_SEND_TIMEOUT_MS: u64 = 30_000;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Write debug output to the log file
    pub debug: bool,

    /// Attach a backtrace to debug output
    pub trace: bool,

    /// Ask before sending a pasted or dropped image
    pub require_confirmation: bool,

    /// Compress pasted or dropped files before sending
    pub compress_files: bool,

    /// Compression quality in (0, 1]
    pub compression_quality: Option<f32>,

    /// Timeout for message creation in milliseconds, 0 to wait forever
    pub send_timeout_ms: u64,

    /// Desktop notifications for failed sends
    pub notifications: NotificationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            trace: false,
            require_confirmation: false,
            compress_files: true,
            compression_quality: None,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            notifications: NotificationConfig::default(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub debug: Option<bool>,
    pub trace: Option<bool>,
    pub require_confirmation: Option<bool>,
    pub compress_files: Option<bool>,
    pub compression_quality: Option<f32>,
}

impl Config {
    /// Load configuration from the default config file path.
    ///
    /// Returns default configuration if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(MODULE_NAME)
            .join("config.toml")
    }

    /// Merge with CLI overrides.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(debug) = overrides.debug {
            self.debug = debug;
        }
        if let Some(trace) = overrides.trace {
            self.trace = trace;
        }
        if let Some(confirm) = overrides.require_confirmation {
            self.require_confirmation = confirm;
        }
        if let Some(compress) = overrides.compress_files {
            self.compress_files = compress;
        }
        if overrides.compression_quality.is_some() {
            self.compression_quality = overrides.compression_quality;
        }
        self
    }

    /// Get the compression quality, falling back to environment variable or default.
    pub fn compression_quality(&self) -> f32 {
        self.compression_quality
            .or_else(|| {
                std::env::var("CHAT_IMAGES_QUALITY")
                    .ok()
                    .and_then(|q| q.parse().ok())
            })
            .unwrap_or(DEFAULT_QUALITY)
    }

    pub fn send_timeout(&self) -> Option<Duration> {
        (self.send_timeout_ms > 0).then(|| Duration::from_millis(self.send_timeout_ms))
    }

    /// Settings for the chat coordinator
    pub fn send_settings(&self) -> SendSettings {
        SendSettings {
            namespace: MODULE_NAME.to_string(),
            compression_quality: self.compress_files.then(|| self.compression_quality()),
            send_timeout: self.send_timeout(),
        }
    }
}
