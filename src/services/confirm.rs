//! Asks the user on the terminal before an image is sent.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::chat::Confirmer;
use crate::payload::ImageReference;

/// Confirmer reading `y`/`n` answers from stdin
pub type PromptConfirmer = LineConfirmer<BufReader<Stdin>>;

impl PromptConfirmer {
    pub fn stdin() -> Self {
        LineConfirmer::new(BufReader::new(tokio::io::stdin()))
    }
}

/// Prompts on stderr and reads one answer line per image
pub struct LineConfirmer<R> {
    reader: Mutex<R>,
}

impl<R: AsyncBufRead + Unpin> LineConfirmer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

impl<R: AsyncBufRead + Unpin> Confirmer for LineConfirmer<R> {
    async fn confirm(&self, image: &ImageReference) -> bool {
        eprint!("Send image {}? [y] yes  [n] no: ", image.describe());
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        let mut reader = self.reader.lock().await;
        match reader.read_line(&mut answer).await {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
