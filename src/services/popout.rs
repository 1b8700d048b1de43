//! Opens images with the platform's default viewer.

use std::process::{Command, Stdio};
use std::sync::Arc;

use arboard::Clipboard;

use crate::chat::{Popout, PopoutOptions};
use crate::error::{ChatImagesError, Result};
use crate::log::Logger;

pub struct SystemPopout {
    logger: Arc<Logger>,
}

impl SystemPopout {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    fn opener() -> Command {
        if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", ""]);
            command
        } else {
            Command::new("xdg-open")
        }
    }

    /// Put the URL on the clipboard so it can be passed on
    fn share(&self, url: &str) {
        let result = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.to_string()));
        match result {
            Ok(()) => self.logger.debug_untraced(&format!("copied {} to clipboard", url)),
            Err(e) => self.logger.log(&format!("Could not copy image URL: {}", e)),
        }
    }
}

impl Popout for SystemPopout {
    fn render(&self, url: &str, options: PopoutOptions) -> Result<()> {
        let mut command = Self::opener();
        let program = command.get_program().to_string_lossy().into_owned();

        command
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ChatImagesError::Popout(format!("{}: {}", program, e)))?;

        self.logger
            .debug_untraced(&format!("opened {} (editable: {})", url, options.editable));

        if options.shareable {
            self.share(url);
        }

        Ok(())
    }
}
