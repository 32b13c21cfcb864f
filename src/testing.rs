//! In-memory collaborator fakes shared across unit tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{NotificationError, OcrError, StorageError};
use crate::notifier::Notifier;
use crate::ocr::{OcrText, TextRecognizer};
use crate::storage::MessageStore;
use crate::types::alert::{AlertRecord, StoredAlert};
use crate::types::message::{NewImageRecord, NewMessageRecord};

/// Recording store; optionally fails alert persistence.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    pub messages: Mutex<Vec<NewMessageRecord>>,
    pub images: Mutex<Vec<NewImageRecord>>,
    pub alerts: Mutex<Vec<AlertRecord>>,
    fail_alerts: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_alerts() -> Self {
        Self {
            fail_alerts: true,
            ..Self::default()
        }
    }

    fn next(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn save_message(&self, message: &NewMessageRecord) -> Result<i64, StorageError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(self.next())
    }

    async fn save_image(&self, image: &NewImageRecord) -> Result<i64, StorageError> {
        self.images.lock().unwrap().push(image.clone());
        Ok(self.next())
    }

    async fn create_alert(&self, alert: &AlertRecord) -> Result<i64, StorageError> {
        if self.fail_alerts {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(self.next())
    }

    async fn recent_alerts(&self, _hours: i32) -> Result<Vec<StoredAlert>, StorageError> {
        Ok(Vec::new())
    }
}

/// Notifier that records sent warnings; optionally fails every send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(i64, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, destination: i64, text: &str) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Delivery(
                "transport unavailable".to_string(),
            ));
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination, text.to_string()));
        Ok(())
    }
}

/// OCR fake that returns a fixed extraction for every image.
pub struct StaticRecognizer {
    pub text: String,
    pub confidence: f64,
}

#[async_trait]
impl TextRecognizer for StaticRecognizer {
    async fn extract_text(&self, _image: &[u8]) -> Result<OcrText, OcrError> {
        Ok(OcrText {
            text: self.text.clone(),
            confidence: self.confidence,
        })
    }
}

/// OCR fake that always fails.
pub struct BrokenRecognizer;

#[async_trait]
impl TextRecognizer for BrokenRecognizer {
    async fn extract_text(&self, _image: &[u8]) -> Result<OcrText, OcrError> {
        Err(OcrError("engine unavailable".to_string()))
    }
}
