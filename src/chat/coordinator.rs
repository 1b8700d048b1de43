//! Turns a paste or drop on the chat input into an image message.
//!
//! The coordinator owns the whole interaction: it checks the input can take a
//! send, extracts the image, optionally asks for confirmation, marks the input
//! busy, builds the markup and awaits the outgoing message API. Nothing it does
//! returns an error to the caller; failures are reported and summarized in the
//! returned [`InteractionOutcome`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::compress::compress;
use crate::error::{ChatImagesError, CompressionResult, Result, SendError, SendResult};
use crate::log::Logger;
use crate::markup::{MODULE_NAME, build_image_markup, convert_text_to_image_in};
use crate::payload::{BinaryFile, ChatEvent, ImageReference, extract_image};

use super::state::InteractionState;
use super::widget::ChatWidget;

/// Outgoing message API
pub trait MessageSink {
    /// Create a chat message with the given content
    fn create_message(&self, content: &str) -> impl Future<Output = SendResult<()>>;
}

/// Decides whether an extracted image should be sent
pub trait Confirmer {
    fn confirm(&self, image: &ImageReference) -> impl Future<Output = bool>;
}

/// Surfaces failures to the user
pub trait ErrorReporter {
    fn report(&self, error: &ChatImagesError);
}

/// Parameters for building and sending image messages
#[derive(Debug, Clone, PartialEq)]
pub struct SendSettings {
    /// Namespace for generated markup
    pub namespace: String,
    /// Compress binary files at this quality before sending; `None` sends them as-is
    pub compression_quality: Option<f32>,
    /// Give up on the message API after this long
    pub send_timeout: Option<Duration>,
}

impl Default for SendSettings {
    fn default() -> Self {
        Self {
            namespace: MODULE_NAME.to_string(),
            compression_quality: Some(0.8),
            send_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Why an interaction was dropped before extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    WidgetUnavailable,
    WidgetDisabled,
    SendInFlight,
}

/// How an interaction ended
#[derive(Debug)]
pub enum InteractionOutcome {
    Ignored(IgnoreReason),
    NoImage,
    Declined,
    Sent { content: String },
    Failed(ChatImagesError),
}

impl InteractionOutcome {
    /// The state the interaction stopped in
    pub fn state(&self) -> InteractionState {
        match self {
            InteractionOutcome::Ignored(_) => InteractionState::Idle,
            InteractionOutcome::NoImage => InteractionState::NoImage,
            InteractionOutcome::Declined => InteractionState::Declined,
            InteractionOutcome::Sent { .. } => InteractionState::Sent,
            InteractionOutcome::Failed(_) => InteractionState::Failed,
        }
    }
}

pub struct ChatCoordinator<S, C, R> {
    settings: SendSettings,
    sink: S,
    confirmer: C,
    reporter: R,
    logger: Arc<Logger>,
}

impl<S, C, R> ChatCoordinator<S, C, R>
where
    S: MessageSink,
    C: Confirmer,
    R: ErrorReporter,
{
    pub fn new(settings: SendSettings, sink: S, confirmer: C, reporter: R, logger: Arc<Logger>) -> Self {
        Self {
            settings,
            sink,
            confirmer,
            reporter,
            logger,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Handle a paste or drop on `widget`.
    ///
    /// A missing, disabled or already-sending widget is left alone. With
    /// `require_confirmation` the confirmer is asked before the widget turns
    /// busy. Once busy, the widget is restored whether the send succeeds or not.
    pub async fn handle_interaction(
        &self,
        require_confirmation: bool,
        widget: Option<&ChatWidget>,
        event: &ChatEvent,
    ) -> InteractionOutcome {
        let Some(widget) = widget else {
            self.logger.debug_untraced("no chat input, ignoring event");
            return InteractionOutcome::Ignored(IgnoreReason::WidgetUnavailable);
        };

        if widget.is_disabled() {
            self.logger
                .debug_untraced(&format!("{} is disabled, ignoring {}", widget.id(), event.kind()));
            return InteractionOutcome::Ignored(IgnoreReason::WidgetDisabled);
        }

        let Some(reservation) = widget.try_reserve() else {
            self.logger
                .debug_untraced(&format!("{} already sending, ignoring {}", widget.id(), event.kind()));
            return InteractionOutcome::Ignored(IgnoreReason::SendInFlight);
        };

        let mut progress = Progress::new(&self.logger, widget.id());
        progress.advance(InteractionState::Extracting);

        let Some(image) = extract_image(event) else {
            progress.advance(InteractionState::NoImage);
            return InteractionOutcome::NoImage;
        };
        self.logger
            .debug(&format!("{} carried image {}", event.kind(), image.describe()));

        if require_confirmation {
            progress.advance(InteractionState::AwaitingConfirmation);
            if !self.confirmer.confirm(&image).await {
                progress.advance(InteractionState::Declined);
                return InteractionOutcome::Declined;
            }
        }

        progress.advance(InteractionState::Sending);
        let _busy = reservation.mark_busy();

        match self.send_image(image).await {
            Ok(content) => {
                progress.advance(InteractionState::Sent);
                InteractionOutcome::Sent { content }
            }
            Err(e) => {
                self.logger.log(&format!("Failed to send image: {}", e));
                self.reporter.report(&e);
                progress.advance(InteractionState::Failed);
                InteractionOutcome::Failed(e)
            }
        }
    }

    /// Content to post for a typed message: image markup for a sole image URL,
    /// the text itself otherwise.
    pub fn prepare_text_message(&self, text: &str) -> String {
        match convert_text_to_image_in(&self.settings.namespace, text) {
            Some(content) => {
                if content != text {
                    self.logger.debug("converted image link to image message");
                }
                content
            }
            None => text.to_string(),
        }
    }

    /// Post a typed message, converting it first when it is a sole image URL
    pub async fn send_text(&self, text: &str) -> Result<String> {
        let content = self.prepare_text_message(text);
        self.create_message(&content).await?;
        Ok(content)
    }

    async fn send_image(&self, image: ImageReference) -> Result<String> {
        let url = match image {
            ImageReference::Url(url) => url,
            ImageReference::File(file) => self.prepare_file(file).await?.to_data_url(),
        };

        let content = build_image_markup(&self.settings.namespace, &url)?;
        self.create_message(&content).await?;
        Ok(content)
    }

    async fn prepare_file(&self, file: BinaryFile) -> CompressionResult<BinaryFile> {
        match self.settings.compression_quality {
            Some(quality) => {
                let original_len = file.len();
                let compressed = compress(file, quality).await?;
                self.logger.debug_untraced(&format!(
                    "compressed {} bytes to {} bytes",
                    original_len,
                    compressed.len()
                ));
                Ok(compressed)
            }
            None => Ok(file),
        }
    }

    async fn create_message(&self, content: &str) -> SendResult<()> {
        match self.settings.send_timeout {
            Some(limit) => tokio::time::timeout(limit, self.sink.create_message(content))
                .await
                .map_err(|_| SendError::Timeout(limit.as_millis() as u64))?,
            None => self.sink.create_message(content).await,
        }
    }
}

/// Walks an interaction through its states, logging each step
struct Progress<'a> {
    logger: &'a Logger,
    widget_id: &'a str,
    state: InteractionState,
}

impl<'a> Progress<'a> {
    fn new(logger: &'a Logger, widget_id: &'a str) -> Self {
        Self {
            logger,
            widget_id,
            state: InteractionState::Idle,
        }
    }

    fn advance(&mut self, next: InteractionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        self.logger.debug_untraced(&format!(
            "{}: {:?} -> {:?}",
            self.widget_id, self.state, next
        ));
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::widget::ChatWidgetState;
    use crate::payload::{DataCarrier, DataItem, HTML_MIME};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl MessageSink for RecordingSink {
        async fn create_message(&self, content: &str) -> SendResult<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(SendError::Rejected("server said no".to_string()));
            }
            self.messages.lock().unwrap().push(content.to_string());
            Ok(())
        }
    }

    struct FixedConfirmer {
        answer: bool,
        asked: AtomicUsize,
    }

    impl FixedConfirmer {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: AtomicUsize::new(0),
            }
        }
    }

    impl Confirmer for FixedConfirmer {
        async fn confirm(&self, _image: &ImageReference) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        errors: Mutex<Vec<String>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, error: &ChatImagesError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    type TestCoordinator = ChatCoordinator<RecordingSink, FixedConfirmer, RecordingReporter>;

    fn coordinator_with(sink: RecordingSink, settings: SendSettings, confirm: bool) -> TestCoordinator {
        ChatCoordinator::new(
            settings,
            sink,
            FixedConfirmer::new(confirm),
            RecordingReporter::default(),
            Arc::new(Logger::disabled()),
        )
    }

    fn coordinator(sink: RecordingSink) -> TestCoordinator {
        coordinator_with(sink, SendSettings::default(), true)
    }

    fn url_event(url: &str) -> ChatEvent {
        ChatEvent::paste(DataCarrier::new().with_data(HTML_MIME, format!(r#"<img src="{}">"#, url)))
    }

    /// Noisy RGB image so the lossless source is larger than its JPEG
    fn noisy_image(format: image::ImageFormat, side: u32) -> Vec<u8> {
        let mut seed: u32 = 0x2545_f491;
        let img = image::RgbImage::from_fn(side, side, |_, _| {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let [r, g, b, _] = seed.to_le_bytes();
            image::Rgb([r, g, b])
        });

        let mut data = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut data, format)
            .unwrap();
        data.into_inner()
    }

    fn assert_restored(widget: &ChatWidget) {
        assert_eq!(widget.state(), ChatWidgetState::default());
        assert!(widget.try_reserve().is_some());
    }

    #[tokio::test]
    async fn test_sends_url_markup() {
        let coordinator = coordinator(RecordingSink::default());
        let widget = ChatWidget::new("chat");

        let outcome = coordinator
            .handle_interaction(false, Some(&widget), &url_event("https://host/img.png"))
            .await;

        let expected = r#"<div class="chat-images-container"><img src="https://host/img.png" alt="chat-images"></div>"#;
        assert!(matches!(outcome, InteractionOutcome::Sent { ref content } if content == expected));
        assert_eq!(*coordinator.sink().messages.lock().unwrap(), vec![expected.to_string()]);
        assert_eq!(coordinator.confirmer.asked.load(Ordering::SeqCst), 0);
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_failed_send_restores_widget_and_reports() {
        let coordinator = coordinator(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let widget = ChatWidget::new("chat");

        let outcome = coordinator
            .handle_interaction(false, Some(&widget), &url_event("https://host/img.png"))
            .await;

        assert!(matches!(
            outcome,
            InteractionOutcome::Failed(ChatImagesError::Send(SendError::Rejected(_)))
        ));
        assert_eq!(coordinator.reporter().errors.lock().unwrap().len(), 1);
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_widget_is_busy_while_sending() {
        let coordinator = coordinator(RecordingSink {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let widget = ChatWidget::new("chat");
        let event = url_event("https://host/img.png");

        let send = coordinator.handle_interaction(false, Some(&widget), &event);
        let observe = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            widget.state()
        };
        let (outcome, during) = tokio::join!(send, observe);

        assert!(during.disabled);
        assert!(during.busy_indicator);
        assert!(matches!(outcome, InteractionOutcome::Sent { .. }));
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_overlapping_interaction_is_ignored() {
        let coordinator = coordinator(RecordingSink {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let widget = ChatWidget::new("chat");
        let event = url_event("https://host/img.png");

        let (first, second) = tokio::join!(
            coordinator.handle_interaction(false, Some(&widget), &event),
            coordinator.handle_interaction(false, Some(&widget), &event)
        );

        let ignored = [&first, &second]
            .iter()
            .filter(|o| matches!(o, InteractionOutcome::Ignored(_)))
            .count();
        assert_eq!(ignored, 1);
        assert_eq!(coordinator.sink().messages.lock().unwrap().len(), 1);
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let settings = SendSettings {
            send_timeout: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let coordinator = coordinator_with(
            RecordingSink {
                delay: Some(Duration::from_secs(5)),
                ..Default::default()
            },
            settings,
            true,
        );
        let widget = ChatWidget::new("chat");

        let outcome = coordinator
            .handle_interaction(false, Some(&widget), &url_event("https://host/img.png"))
            .await;

        assert!(matches!(
            outcome,
            InteractionOutcome::Failed(ChatImagesError::Send(SendError::Timeout(20)))
        ));
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_disabled_widget_is_left_alone() {
        let coordinator = coordinator(RecordingSink::default());
        let widget = ChatWidget::new("chat");
        widget.set_disabled(true);

        let outcome = coordinator
            .handle_interaction(true, Some(&widget), &url_event("https://host/img.png"))
            .await;

        assert!(matches!(
            outcome,
            InteractionOutcome::Ignored(IgnoreReason::WidgetDisabled)
        ));
        assert!(coordinator.sink().messages.lock().unwrap().is_empty());
        assert_eq!(coordinator.confirmer.asked.load(Ordering::SeqCst), 0);
        assert!(widget.is_disabled());
    }

    #[tokio::test]
    async fn test_missing_widget() {
        let coordinator = coordinator(RecordingSink::default());
        let outcome = coordinator
            .handle_interaction(false, None, &url_event("https://host/img.png"))
            .await;
        assert!(matches!(
            outcome,
            InteractionOutcome::Ignored(IgnoreReason::WidgetUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_event_without_image() {
        let coordinator = coordinator(RecordingSink::default());
        let widget = ChatWidget::new("chat");
        let event = ChatEvent::paste(DataCarrier::new().with_data("text/plain", "hello"));

        let outcome = coordinator.handle_interaction(false, Some(&widget), &event).await;

        assert_eq!(outcome.state(), InteractionState::NoImage);
        assert!(coordinator.sink().messages.lock().unwrap().is_empty());
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_confirmation_accepted() {
        let coordinator = coordinator_with(RecordingSink::default(), SendSettings::default(), true);
        let widget = ChatWidget::new("chat");

        let outcome = coordinator
            .handle_interaction(true, Some(&widget), &url_event("https://host/img.png"))
            .await;

        assert_eq!(outcome.state(), InteractionState::Sent);
        assert_eq!(coordinator.confirmer.asked.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirmation_declined() {
        let coordinator = coordinator_with(RecordingSink::default(), SendSettings::default(), false);
        let widget = ChatWidget::new("chat");

        let outcome = coordinator
            .handle_interaction(true, Some(&widget), &url_event("https://host/img.png"))
            .await;

        assert_eq!(outcome.state(), InteractionState::Declined);
        assert!(coordinator.sink().messages.lock().unwrap().is_empty());
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_unsafe_url_is_refused() {
        let coordinator = coordinator(RecordingSink::default());
        let widget = ChatWidget::new("chat");
        let event = ChatEvent::paste(
            DataCarrier::new().with_data(HTML_MIME, r#"<img src="https://h/a.png&quot;onerror=x">"#),
        );

        let outcome = coordinator.handle_interaction(false, Some(&widget), &event).await;

        assert!(matches!(
            outcome,
            InteractionOutcome::Failed(ChatImagesError::Markup(_))
        ));
        assert!(coordinator.sink().messages.lock().unwrap().is_empty());
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_uncompressed_file_is_sent_as_data_url() {
        let settings = SendSettings {
            compression_quality: None,
            ..Default::default()
        };
        let coordinator = coordinator_with(RecordingSink::default(), settings, true);
        let widget = ChatWidget::new("chat");
        let event = ChatEvent::dropped(
            DataCarrier::new().with_item(DataItem::file("a.png", "image/png", vec![1, 2, 3])),
        );

        let outcome = coordinator.handle_interaction(false, Some(&widget), &event).await;

        let expected = r#"<div class="chat-images-container"><img src="data:image/png;base64,AQID" alt="chat-images"></div>"#;
        assert!(matches!(outcome, InteractionOutcome::Sent { ref content } if content == expected));
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_compression_failure_is_reported() {
        let coordinator = coordinator(RecordingSink::default());
        let widget = ChatWidget::new("chat");
        let event = ChatEvent::dropped(
            DataCarrier::new().with_item(DataItem::file("a.png", "image/png", vec![1, 2, 3])),
        );

        let outcome = coordinator.handle_interaction(false, Some(&widget), &event).await;

        assert!(matches!(
            outcome,
            InteractionOutcome::Failed(ChatImagesError::Compression(_))
        ));
        assert_eq!(coordinator.reporter().errors.lock().unwrap().len(), 1);
        assert!(coordinator.sink().messages.lock().unwrap().is_empty());
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_compressed_file_is_sent_as_jpeg() {
        let settings = SendSettings {
            compression_quality: Some(0.5),
            ..Default::default()
        };
        let coordinator = coordinator_with(RecordingSink::default(), settings, true);
        let widget = ChatWidget::new("chat");
        let png = noisy_image(image::ImageFormat::Png, 256);
        let event = ChatEvent::dropped(
            DataCarrier::new().with_item(DataItem::file("noise.png", "image/png", png)),
        );

        let outcome = coordinator.handle_interaction(false, Some(&widget), &event).await;

        match outcome {
            InteractionOutcome::Sent { content } => {
                assert!(content.contains("data:image/jpeg;base64,"));
                assert!(content.starts_with(r#"<div class="chat-images-container"><img src="#));
            }
            other => panic!("expected a sent message, got {:?}", other),
        }
        assert_eq!(coordinator.sink().messages.lock().unwrap().len(), 1);
        assert!(coordinator.reporter().errors.lock().unwrap().is_empty());
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_dropped_webp_is_sent() {
        let coordinator = coordinator(RecordingSink::default());
        let widget = ChatWidget::new("chat");
        let webp = noisy_image(image::ImageFormat::WebP, 64);
        let event = ChatEvent::dropped(
            DataCarrier::new().with_item(DataItem::file("photo.webp", "image/webp", webp)),
        );

        let outcome = coordinator.handle_interaction(false, Some(&widget), &event).await;

        match outcome {
            InteractionOutcome::Sent { content } => assert!(
                content.contains("data:image/jpeg;base64,")
                    || content.contains("data:image/webp;base64,")
            ),
            other => panic!("expected a sent message, got {:?}", other),
        }
        assert!(coordinator.reporter().errors.lock().unwrap().is_empty());
        assert_restored(&widget);
    }

    #[tokio::test]
    async fn test_send_text_converts_image_links() {
        let coordinator = coordinator(RecordingSink::default());

        let image_link = r#"<a href="https://x.com/a.png">https://x.com/a.png</a>"#;
        let content = coordinator.send_text(image_link).await.unwrap();
        assert!(content.starts_with(r#"<div class="chat-images-container">"#));

        let plain = coordinator.send_text("hello").await.unwrap();
        assert_eq!(plain, "hello");
        assert_eq!(coordinator.sink().messages.lock().unwrap().len(), 2);
    }
}
