//! Type definitions for the fraud monitoring pipeline

pub mod alert;
pub mod message;

pub use alert::{
    AlertCategory, AlertRecord, AlertStatus, AlertSummary, AlertType, Severity, StoredAlert,
};
pub use message::{ImageAttachment, IncomingMessage, MessageKind, NewImageRecord, NewMessageRecord};
