//! Message ingest orchestration.
//!
//! Persists the incoming message, runs OCR over image attachments, and
//! feeds the combined direct and extracted text into the analysis engine.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::detector::{AnalysisOutcome, FraudDetector};
use crate::error::StorageError;
use crate::notifier::Notifier;
use crate::ocr::TextRecognizer;
use crate::storage::MessageStore;
use crate::types::message::{ImageAttachment, IncomingMessage, NewImageRecord, NewMessageRecord};

/// What one processed message produced
#[derive(Debug)]
pub struct IngestReport {
    /// Storage id of the persisted message
    pub message_id: i64,
    pub outcome: AnalysisOutcome,
}

/// Drives a message through persistence, OCR and analysis
pub struct MessageIngestor {
    store: Arc<dyn MessageStore>,
    detector: Arc<FraudDetector>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    min_ocr_confidence: f64,
}

impl MessageIngestor {
    pub fn new(
        store: Arc<dyn MessageStore>,
        detector: Arc<FraudDetector>,
        recognizer: Option<Arc<dyn TextRecognizer>>,
        min_ocr_confidence: f64,
    ) -> Self {
        Self {
            store,
            detector,
            recognizer,
            min_ocr_confidence,
        }
    }

    /// Process one incoming message.
    ///
    /// The message row must persist for analysis to have something to point
    /// at, so a `save_message` failure aborts the call. Attachment OCR and
    /// image persistence are best-effort.
    pub async fn process(
        &self,
        incoming: &IncomingMessage,
        notifier: Option<&dyn Notifier>,
    ) -> Result<IngestReport, StorageError> {
        let record = NewMessageRecord::from_incoming(incoming);
        let message_id = self.store.save_message(&record).await?;

        let mut text_parts: Vec<String> = Vec::new();
        if let Some(text) = &incoming.text {
            if !text.trim().is_empty() {
                text_parts.push(text.clone());
            }
        }

        for attachment in &incoming.attachments {
            if let Some(text) = self.extract_attachment_text(message_id, attachment).await {
                text_parts.push(text);
            }
        }

        let combined = text_parts.join("\n");
        let outcome = self
            .detector
            .analyze(&combined, message_id, Some(incoming.source_id), notifier)
            .await;

        Ok(IngestReport {
            message_id,
            outcome,
        })
    }

    /// OCR one attachment and persist the image row.
    ///
    /// Returns the extracted text only when it meets the confidence floor.
    /// Extraction and persistence failures are logged and skipped; losing an
    /// image row must not lose the message analysis.
    async fn extract_attachment_text(
        &self,
        message_id: i64,
        attachment: &ImageAttachment,
    ) -> Option<String> {
        let recognizer = self.recognizer.as_ref()?;

        let ocr = match recognizer.extract_text(&attachment.data).await {
            Ok(ocr) => ocr,
            Err(e) => {
                warn!(
                    message_id,
                    file_id = %attachment.file_id,
                    error = %e,
                    "OCR extraction failed"
                );
                return None;
            }
        };

        let accepted = ocr.confidence >= self.min_ocr_confidence && !ocr.text.trim().is_empty();

        let image = NewImageRecord {
            message_id,
            file_id: attachment.file_id.clone(),
            ocr_text: accepted.then(|| ocr.text.clone()),
            ocr_confidence: Some(ocr.confidence),
        };
        if let Err(e) = self.store.save_image(&image).await {
            warn!(
                message_id,
                file_id = %attachment.file_id,
                error = %e,
                "Failed to save image row"
            );
        }

        if accepted {
            debug!(
                message_id,
                confidence = ocr.confidence,
                "OCR text accepted for analysis"
            );
            Some(ocr.text)
        } else {
            debug!(
                message_id,
                confidence = ocr.confidence,
                "OCR text rejected (below confidence floor or empty)"
            );
            None
        }
    }
}
