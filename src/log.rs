//! File logger with explicit debug and trace switches.
//!
//! A `Logger` is constructed once from configuration and shared by reference
//! (usually as `Arc<Logger>`) with the components that need it.

use std::backtrace::Backtrace;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;

const PREFIX: &str = "Chat Images |";

pub struct Logger {
    file: Mutex<Option<File>>,
    debugging: bool,
    trace: bool,
}

impl Logger {
    /// Open a timestamped log file under `~/.chat-images/logs`.
    pub fn init(debugging: bool, trace: bool) -> std::io::Result<(Self, PathBuf)> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chat-images")
            .join("logs");

        std::fs::create_dir_all(&log_dir)?;

        let log_path = log_dir.join(format!("chat_images_{}.log", timestamp));

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_path)?;

        let logger = Self {
            file: Mutex::new(Some(file)),
            debugging,
            trace,
        };
        logger.log("=== chat-images started ===");

        Ok((logger, log_path))
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self {
            file: Mutex::new(None),
            debugging: false,
            trace: false,
        }
    }

    pub fn is_debugging(&self) -> bool {
        self.debugging
    }

    /// Log a message with timestamp
    pub fn log(&self, msg: &str) {
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        let line = format!("[{}] {} {}\n", timestamp, PREFIX, msg);

        if let Ok(mut guard) = self.file.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.write_all(line.as_bytes());
                let _ = file.flush();
            }
        }
    }

    /// Log a debug message, with a backtrace when tracing is on.
    pub fn debug(&self, msg: &str) {
        self.debug_with(msg, true);
    }

    /// Log a debug message without a backtrace, even when tracing is on.
    pub fn debug_untraced(&self, msg: &str) {
        self.debug_with(msg, false);
    }

    fn debug_with(&self, msg: &str, do_trace: bool) {
        if !self.debugging || msg.is_empty() {
            return;
        }

        if self.trace && do_trace {
            self.log(&format!("{}\n{}", msg, Backtrace::force_capture()));
        } else {
            self.log(msg);
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("debugging", &self.debugging)
            .field("trace", &self.trace)
            .finish()
    }
}
