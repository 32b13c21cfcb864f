//! Chat-Group Fraud Monitoring Library
//!
//! Ingests messages from monitored chat groups, persists them, extracts
//! text from image attachments through an OCR collaborator, scores the text
//! for fraud indicators and brand mentions, and emits alerts with outbound
//! warning messages.

pub mod config;
pub mod consumer;
pub mod detector;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod notifier;
pub mod ocr;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use consumer::MessageConsumer;
pub use detector::{AnalysisOutcome, AnalysisResult, FraudDetector};
pub use ingest::MessageIngestor;
pub use notifier::{NatsNotifier, Notifier};
pub use storage::{MessageStore, PgMessageStore};
pub use types::{alert::AlertSummary, message::IncomingMessage};
