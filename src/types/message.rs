//! Chat message data structures for fraud monitoring

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse content classification of an incoming message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Other,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Other => "other",
        }
    }
}

/// An image attached to a message, delivered by the transport layer.
///
/// `data` holds the raw image bytes handed to the OCR collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// Transport-assigned file identifier
    pub file_id: String,

    /// Raw image bytes
    #[serde(default)]
    pub data: Vec<u8>,
}

/// A message received from a monitored chat group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Message identifier assigned by the originating platform
    pub message_id: i64,

    /// Identifier of the group the message was posted in
    pub source_id: i64,

    /// Identifier of the posting user, when known
    pub user_id: Option<i64>,

    /// Display name of the posting user, when known
    pub username: Option<String>,

    /// Direct text content, if any
    pub text: Option<String>,

    /// Image attachments to be run through OCR
    #[serde(default)]
    pub attachments: Vec<ImageAttachment>,

    /// Receipt timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    /// Create a text-only message with required fields
    pub fn text(message_id: i64, source_id: i64, text: impl Into<String>) -> Self {
        Self {
            message_id,
            source_id,
            user_id: None,
            username: None,
            text: Some(text.into()),
            attachments: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Content classification used for the persisted message row
    pub fn kind(&self) -> MessageKind {
        match (&self.text, self.attachments.is_empty()) {
            (Some(_), _) => MessageKind::Text,
            (None, false) => MessageKind::Image,
            (None, true) => MessageKind::Other,
        }
    }
}

/// Row data for persisting a message
#[derive(Debug, Clone)]
pub struct NewMessageRecord {
    pub origin_message_id: i64,
    pub source_id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub text: Option<String>,
    pub kind: MessageKind,
}

impl NewMessageRecord {
    pub fn from_incoming(message: &IncomingMessage) -> Self {
        Self {
            origin_message_id: message.message_id,
            source_id: message.source_id,
            user_id: message.user_id,
            username: message.username.clone(),
            text: message.text.clone(),
            kind: message.kind(),
        }
    }
}

/// Row data for persisting an OCR-processed image
#[derive(Debug, Clone)]
pub struct NewImageRecord {
    pub message_id: i64,
    pub file_id: String,
    pub ocr_text: Option<String>,
    pub ocr_confidence: Option<f64>,
}
