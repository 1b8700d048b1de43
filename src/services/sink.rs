//! Message sink that prints each created message as a JSON line.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::chat::MessageSink;
use crate::error::{SendError, SendResult};

/// Payload of the outgoing message API
#[derive(Debug, Serialize)]
struct ChatMessageData<'a> {
    content: &'a str,
}

/// Writes `{"content": ...}` lines to an async writer
pub struct JsonLineSink<W> {
    writer: Mutex<W>,
}

impl JsonLineSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: AsyncWrite + Unpin> MessageSink for JsonLineSink<W> {
    async fn create_message(&self, content: &str) -> SendResult<()> {
        let mut line = serde_json::to_string(&ChatMessageData { content })
            .map_err(|e| SendError::Rejected(e.to_string()))?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|_| SendError::Unavailable)?;
        writer.flush().await.map_err(|_| SendError::Unavailable)
    }
}
