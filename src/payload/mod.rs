//! Paste and drop payloads
//!
//! A `ChatEvent` carries at most one data carrier: clipboard data for pastes,
//! a data transfer for drops. Carriers expose text keyed by MIME type and an
//! ordered list of typed items, the same shape browsers hand to event handlers.

mod extract;

use std::collections::BTreeMap;

use base64::Engine;

#[allow(unused_imports)]
pub use extract::{extract_image, first_image_src, img_sources};

/// MIME key under which carriers expose HTML text
pub const HTML_MIME: &str = "text/html";

/// A binary file handed over by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl BinaryFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Inline the bytes as a `data:` URL
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.mime_type, encoded)
    }
}

/// The image found in an event: a hosted URL or raw file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Url(String),
    File(BinaryFile),
}

impl ImageReference {
    /// Short description for logs and prompts
    pub fn describe(&self) -> String {
        match self {
            ImageReference::Url(url) => url.clone(),
            ImageReference::File(file) => {
                format!("{} ({}, {} bytes)", file.name, file.mime_type, file.len())
            }
        }
    }
}

/// One typed entry of a carrier's item list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    pub mime_type: String,
    pub name: Option<String>,
    pub data: Vec<u8>,
}

impl DataItem {
    /// A file item
    pub fn file(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            name: Some(name.into()),
            data,
        }
    }

    /// A string item
    pub fn text(mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            name: None,
            data: text.into().into_bytes(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.contains("image")
    }

    pub fn to_binary_file(&self) -> BinaryFile {
        BinaryFile {
            name: self.name.clone().unwrap_or_else(|| "image".to_string()),
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
        }
    }
}

/// Clipboard data or drag-and-drop data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataCarrier {
    data: BTreeMap<String, String>,
    items: Vec<DataItem>,
}

impl DataCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        self.set_data(mime_type, text);
        self
    }

    pub fn with_item(mut self, item: DataItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn set_data(&mut self, mime_type: impl Into<String>, text: impl Into<String>) {
        self.data.insert(mime_type.into(), text.into());
    }

    pub fn push_item(&mut self, item: DataItem) {
        self.items.push(item);
    }

    /// Text stored under a MIME type; empty strings count as absent
    pub fn get_data(&self, mime_type: &str) -> Option<&str> {
        self.data
            .get(mime_type)
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    pub fn items(&self) -> &[DataItem] {
        &self.items
    }
}

/// A paste or drop on the chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Paste { clipboard_data: Option<DataCarrier> },
    Drop { data_transfer: Option<DataCarrier> },
}

impl ChatEvent {
    pub fn paste(carrier: DataCarrier) -> Self {
        ChatEvent::Paste {
            clipboard_data: Some(carrier),
        }
    }

    pub fn dropped(carrier: DataCarrier) -> Self {
        ChatEvent::Drop {
            data_transfer: Some(carrier),
        }
    }

    pub fn carrier(&self) -> Option<&DataCarrier> {
        match self {
            ChatEvent::Paste { clipboard_data } => clipboard_data.as_ref(),
            ChatEvent::Drop { data_transfer } => data_transfer.as_ref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::Paste { .. } => "paste",
            ChatEvent::Drop { .. } => "drop",
        }
    }
}
