//! Text extraction collaborator interface.
//!
//! OCR engines live outside this crate; the ingest layer only depends on
//! this seam and the configured confidence floor.

use async_trait::async_trait;

use crate::error::OcrError;

/// Text extracted from an image, with the engine's confidence in percent
#[derive(Debug, Clone)]
pub struct OcrText {
    pub text: String,
    /// 0.0 - 100.0
    pub confidence: f64,
}

/// Optical character recognition seam
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn extract_text(&self, image: &[u8]) -> Result<OcrText, OcrError>;
}
