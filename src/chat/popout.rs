//! Opens posted images in a standalone viewer when clicked.

use regex::Regex;

use crate::error::Result;
use crate::payload::img_sources;

use super::coordinator::ErrorReporter;

/// Display flags passed to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopoutOptions {
    pub editable: bool,
    pub shareable: bool,
}

impl PopoutOptions {
    /// Chat images are read-only but can be shown to other players
    pub const CHAT_IMAGE: PopoutOptions = PopoutOptions {
        editable: false,
        shareable: true,
    };
}

/// External image viewer
pub trait Popout {
    fn render(&self, url: &str, options: PopoutOptions) -> Result<()>;
}

/// A rendered image in a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    pub src: String,
}

/// Images inside `{namespace}-container` blocks of rendered message content
pub fn image_elements(content: &str, namespace: &str) -> Vec<ImageElement> {
    let pattern = format!(
        r#"(?is)<div\s+class\s*=\s*"{}-container"\s*>(.*?)</div>"#,
        regex::escape(namespace)
    );
    let Ok(container) = Regex::new(&pattern) else {
        return vec![];
    };

    container
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .flat_map(|inner| img_sources(inner.as_str()))
        .map(|src| ImageElement { src })
        .collect()
}

/// Click handler for chat images: open the image in the viewer.
///
/// Viewer failures are reported, never propagated into the host's event loop.
pub fn on_image_click<P: Popout, R: ErrorReporter>(popout: &P, reporter: &R, image: &ImageElement) {
    if let Err(e) = popout.render(&image.src, PopoutOptions::CHAT_IMAGE) {
        reporter.report(&e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatImagesError;
    use crate::markup::build_image_markup;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPopout {
        opened: Mutex<Vec<(String, PopoutOptions)>>,
        fail: bool,
    }

    impl Popout for RecordingPopout {
        fn render(&self, url: &str, options: PopoutOptions) -> Result<()> {
            if self.fail {
                return Err(ChatImagesError::Popout("no display".to_string()));
            }
            self.opened.lock().unwrap().push((url.to_string(), options));
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingReporter {
        count: Mutex<usize>,
    }

    impl ErrorReporter for CountingReporter {
        fn report(&self, _error: &ChatImagesError) {
            *self.count.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_click_opens_read_only_shareable_viewer() {
        let popout = RecordingPopout::default();
        let reporter = CountingReporter::default();
        let image = ImageElement {
            src: "https://h/a.png".to_string(),
        };

        on_image_click(&popout, &reporter, &image);

        let opened = popout.opened.lock().unwrap();
        assert_eq!(
            *opened,
            vec![(
                "https://h/a.png".to_string(),
                PopoutOptions {
                    editable: false,
                    shareable: true
                }
            )]
        );
        assert_eq!(*reporter.count.lock().unwrap(), 0);
    }

    #[test]
    fn test_viewer_failure_is_reported() {
        let popout = RecordingPopout {
            fail: true,
            ..Default::default()
        };
        let reporter = CountingReporter::default();
        let image = ImageElement {
            src: "https://h/a.png".to_string(),
        };

        on_image_click(&popout, &reporter, &image);

        assert_eq!(*reporter.count.lock().unwrap(), 1);
    }

    #[test]
    fn test_finds_images_in_message_markup() {
        let content = format!(
            "{}<p><img src=\"https://h/other.png\"></p>",
            build_image_markup("chat-images", "https://h/a.png?x=1&y=2").unwrap()
        );

        assert_eq!(
            image_elements(&content, "chat-images"),
            vec![ImageElement {
                src: "https://h/a.png?x=1&y=2".to_string()
            }]
        );
        assert!(image_elements(&content, "other").is_empty());
    }
}
