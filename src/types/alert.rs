//! Alert data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse alert grouping that decides which warning template is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    /// Actionable fraud warning
    Fraud,
    /// Informational brand-mention notice
    BrandInfo,
}

/// Fine-grained label describing which signals produced the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    FraudDetection,
    HighRiskFraud,
    BrandMention,
    SuspiciousContent,
    BrandMentionInfo,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::FraudDetection => "fraud_detection",
            AlertType::HighRiskFraud => "high_risk_fraud",
            AlertType::BrandMention => "brand_mention",
            AlertType::SuspiciousContent => "suspicious_content",
            AlertType::BrandMentionInfo => "brand_mention_info",
        }
    }

    /// Human-readable form used in warning messages
    pub fn title(&self) -> &'static str {
        match self {
            AlertType::FraudDetection => "Fraud Detection",
            AlertType::HighRiskFraud => "High Risk Fraud",
            AlertType::BrandMention => "Brand Mention",
            AlertType::SuspiciousContent => "Suspicious Content",
            AlertType::BrandMentionInfo => "Brand Mention Info",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status of a persisted alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Reviewed,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Reviewed => "reviewed",
            AlertStatus::Dismissed => "dismissed",
        }
    }
}

/// Four-tier severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify a suspicion score into a severity tier
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Severity::Critical
        } else if score >= 0.7 {
            Severity::High
        } else if score >= 0.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Upper-case label used in warning messages
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Alert produced by the analysis engine, handed to storage for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Client-generated reference quoted in warning messages
    pub alert_ref: Uuid,

    /// Persisted message the alert refers to
    pub message_id: i64,

    /// Signal combination that produced the alert
    pub alert_type: AlertType,

    /// Brand mentions followed by matched pattern labels
    pub keywords_found: Vec<String>,

    /// Suspicion score at alert time (0.0 - 1.0)
    pub confidence_score: f64,

    /// Review status, always `pending` at creation
    pub status: AlertStatus,
}

impl AlertRecord {
    /// Create a new pending alert
    pub fn new(
        message_id: i64,
        alert_type: AlertType,
        keywords_found: Vec<String>,
        confidence_score: f64,
    ) -> Self {
        Self {
            alert_ref: Uuid::new_v4(),
            message_id,
            alert_type,
            keywords_found,
            confidence_score,
            status: AlertStatus::Pending,
        }
    }
}

/// Compact view of a persisted alert returned to the analysis caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Storage-assigned identifier
    pub id: i64,
    pub alert_type: AlertType,
    pub score: f64,
    pub keywords: Vec<String>,
}

/// Alert row joined with message context, as read back from storage
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredAlert {
    pub id: i64,
    pub alert_ref: Uuid,
    pub message_id: i64,
    pub alert_type: String,
    pub keywords_found: Vec<String>,
    pub confidence_score: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub source_id: i64,
    pub username: Option<String>,
    pub message_text: Option<String>,
}
