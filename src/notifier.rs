//! Outbound warning-message delivery.

use async_nats::Client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NotificationError;

/// Warning payload published for delivery to a chat group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningMessage {
    /// Group the warning should be posted to
    pub destination: i64,
    pub text: String,
}

/// Best-effort warning delivery seam. Failures are the caller's to log;
/// the pipeline never retries a send.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, destination: i64, text: &str) -> Result<(), NotificationError>;
}

/// Publishes warning messages to NATS for the transport gateway to deliver
pub struct NatsNotifier {
    client: Client,
    subject: String,
}

impl NatsNotifier {
    /// Create a new warning publisher
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[async_trait]
impl Notifier for NatsNotifier {
    async fn send_message(&self, destination: i64, text: &str) -> Result<(), NotificationError> {
        let payload = serde_json::to_vec(&WarningMessage {
            destination,
            text: text.to_string(),
        })?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            destination,
            subject = %self.subject,
            "Published warning message"
        );

        Ok(())
    }
}
