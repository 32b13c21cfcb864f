//! Fraud and brand-mention analysis engine.
//!
//! A single-pass pipeline: signal extraction → score calculation → alert
//! decision. The engine holds only the compiled keyword set and pattern
//! catalog; every call is a pure function of its input text plus the two
//! collaborator seams (storage, notifier).

pub mod patterns;
pub mod score;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::detector::patterns::{PatternKind, SignalExtractor};
use crate::detector::score::{suspicion_score, HIGH_RISK_THRESHOLD};
use crate::error::{ConfigError, StorageError};
use crate::notifier::Notifier;
use crate::storage::MessageStore;
use crate::types::alert::{AlertCategory, AlertRecord, AlertSummary, AlertType, Severity};

/// Signals and score extracted from one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Matched brand keywords, each at most once, in configured order
    pub brand_mentions: Vec<String>,
    /// Matched pattern categories, each at most once, in catalog order
    pub suspicious_patterns: Vec<PatternKind>,
    /// Bounded suspicion score (0.0 - 1.0)
    pub suspicion_score: f64,
}

impl AnalysisResult {
    fn empty() -> Self {
        Self {
            brand_mentions: Vec::new(),
            suspicious_patterns: Vec::new(),
            suspicion_score: 0.0,
        }
    }

    /// Brand mentions followed by pattern labels, the `keywords_found`
    /// sequence persisted with an alert
    pub fn keywords_found(&self) -> Vec<String> {
        self.brand_mentions
            .iter()
            .cloned()
            .chain(
                self.suspicious_patterns
                    .iter()
                    .map(|p| p.label().to_string()),
            )
            .collect()
    }
}

/// Result of one `analyze` call: at most one alert plus the raw analysis
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub alerts: Vec<AlertSummary>,
    pub analysis: AnalysisResult,
}

impl AnalysisOutcome {
    fn empty() -> Self {
        Self {
            alerts: Vec::new(),
            analysis: AnalysisResult::empty(),
        }
    }
}

/// Analysis engine with dependency-injected storage.
///
/// Immutable after construction; share it across worker tasks with `Arc`.
pub struct FraudDetector {
    signals: SignalExtractor,
    store: Arc<dyn MessageStore>,
}

impl FraudDetector {
    /// Build the engine from the configured brand keywords.
    ///
    /// Fails fast on an unusable keyword set; the process must not start
    /// without one.
    pub fn new(
        brand_keywords: &[String],
        store: Arc<dyn MessageStore>,
    ) -> Result<Self, ConfigError> {
        let signals = SignalExtractor::new(brand_keywords)?;
        info!(
            keywords = signals.keyword_count(),
            "Fraud detector initialized"
        );
        Ok(Self { signals, store })
    }

    /// Analyze one message text and emit at most one alert.
    ///
    /// Empty or blank text short-circuits to an empty outcome without
    /// touching storage or the notifier. This call never fails: a
    /// persistence error drops the alert summary (logged), a notification
    /// error is logged and swallowed after the alert has been persisted.
    pub async fn analyze(
        &self,
        text: &str,
        message_id: i64,
        source_id: Option<i64>,
        notifier: Option<&dyn Notifier>,
    ) -> AnalysisOutcome {
        if text.trim().is_empty() {
            return AnalysisOutcome::empty();
        }

        let text_lower = text.to_lowercase();
        let brand_mentions = self.signals.brand_mentions(&text_lower);
        let suspicious_patterns = self.signals.suspicious_patterns(text);
        let suspicion_score = suspicion_score(&brand_mentions, &suspicious_patterns, &text_lower);

        let analysis = AnalysisResult {
            brand_mentions,
            suspicious_patterns,
            suspicion_score,
        };

        let decision = classify(
            suspicion_score,
            &analysis.brand_mentions,
            &analysis.suspicious_patterns,
        );

        debug!(
            message_id,
            score = suspicion_score,
            brand_mentions = analysis.brand_mentions.len(),
            suspicious_patterns = analysis.suspicious_patterns.len(),
            decision = ?decision,
            "Alert decision"
        );

        let mut alerts = Vec::new();
        if let Some((category, alert_type)) = decision {
            match self
                .emit_alert(message_id, &analysis, category, alert_type, source_id, notifier)
                .await
            {
                Ok(summary) => alerts.push(summary),
                // fail open: message ingestion must not stall on a
                // persistence outage, at the cost of a dropped alert
                Err(e) => {
                    warn!(message_id, error = %e, "Failed to persist alert, dropping it")
                }
            }
        }

        info!(
            message_id,
            score = suspicion_score,
            alerts_generated = alerts.len(),
            "Message analyzed"
        );

        AnalysisOutcome { alerts, analysis }
    }

    /// Persist the alert, then send the warning message if a notifier and
    /// destination are available. Persistence happens exactly once and is
    /// never retried here.
    async fn emit_alert(
        &self,
        message_id: i64,
        analysis: &AnalysisResult,
        category: AlertCategory,
        alert_type: AlertType,
        source_id: Option<i64>,
        notifier: Option<&dyn Notifier>,
    ) -> Result<AlertSummary, StorageError> {
        let keywords = analysis.keywords_found();
        let record = AlertRecord::new(
            message_id,
            alert_type,
            keywords.clone(),
            analysis.suspicion_score,
        );

        let id = self.store.create_alert(&record).await?;

        if let (Some(notifier), Some(destination)) = (notifier, source_id) {
            let warning = compose_warning(
                category,
                alert_type,
                analysis.suspicion_score,
                &keywords,
                &record.alert_ref,
            );

            match notifier.send_message(destination, &warning).await {
                Ok(()) => info!(
                    destination,
                    alert_type = %alert_type,
                    score = analysis.suspicion_score,
                    "Warning message sent"
                ),
                // the alert is already persisted; delivery is best-effort
                Err(e) => warn!(
                    destination,
                    alert_type = %alert_type,
                    error = %e,
                    "Failed to send warning message"
                ),
            }
        }

        Ok(AlertSummary {
            id,
            alert_type,
            score: analysis.suspicion_score,
            keywords,
        })
    }
}

/// Pick the alert category and type for the extracted signals.
///
/// The two entry conditions are a priority, not independent branches: the
/// fraud path is evaluated first and wins.
fn classify(
    score: f64,
    brand_mentions: &[String],
    suspicious_patterns: &[PatternKind],
) -> Option<(AlertCategory, AlertType)> {
    let has_brands = !brand_mentions.is_empty();
    let has_patterns = !suspicious_patterns.is_empty();

    if score > HIGH_RISK_THRESHOLD || (has_brands && has_patterns) {
        let alert_type = if has_brands && has_patterns {
            AlertType::HighRiskFraud
        } else if has_brands {
            // Only reachable through the score-only entry leg. Downstream
            // consumers key on the historical `brand_mention` label for this
            // combination, so it stays even though the brand-info path would
            // otherwise claim it.
            AlertType::BrandMention
        } else if has_patterns {
            AlertType::SuspiciousContent
        } else {
            AlertType::FraudDetection
        };
        Some((AlertCategory::Fraud, alert_type))
    } else if has_brands && !has_patterns {
        Some((AlertCategory::BrandInfo, AlertType::BrandMentionInfo))
    } else {
        None
    }
}

/// Compose the outbound warning text for an alert
fn compose_warning(
    category: AlertCategory,
    alert_type: AlertType,
    score: f64,
    keywords: &[String],
    alert_ref: &Uuid,
) -> String {
    match category {
        AlertCategory::BrandInfo => {
            let brands = if keywords.is_empty() {
                "Financial brand".to_string()
            } else {
                keywords.join(", ")
            };
            format!(
                "\u{1F50D} BRAND MENTION DETECTED\n\n\
                 Brand(s): {brands}\n\
                 Notice: a financial brand was mentioned in this conversation.\n\n\
                 Security reminder: always verify financial requests through official channels \
                 and be cautious of unsolicited financial offers.\n\n\
                 Questions? Contact the group administrators. (ref {alert_ref})"
            )
        }
        AlertCategory::Fraud => {
            let marker = emphasis_marker(alert_type, score);
            let severity = Severity::from_score(score);
            let detected = if keywords.is_empty() {
                "Suspicious activity".to_string()
            } else {
                keywords.join(", ")
            };
            format!(
                "{marker} FRAUD DETECTION ALERT {marker}\n\n\
                 Severity: {severity}\n\
                 Risk score: {score:.1}/1.0\n\
                 Alert type: {title}\n\n\
                 Detected patterns: {detected}\n\n\
                 Security notice: this message has been flagged for potential fraudulent \
                 content. Verify any financial request independently before acting on it.\n\n\
                 False positive? Contact the group administrators. (ref {alert_ref})",
                severity = severity.label(),
                title = alert_type.title(),
            )
        }
    }
}

/// Emphasis marker matching the severity of a fraud warning
fn emphasis_marker(alert_type: AlertType, score: f64) -> &'static str {
    if score >= 0.9 || alert_type == AlertType::HighRiskFraud {
        "\u{1F6A8}"
    } else if score >= 0.7 {
        "\u{26A0}\u{FE0F}"
    } else {
        "\u{1F50D}"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, RecordingNotifier};

    const KEYWORDS: [&str; 4] = ["visa", "mastercard", "paypal", "stripe"];

    fn detector(store: Arc<MemoryStore>) -> FraudDetector {
        let keywords: Vec<String> = KEYWORDS.iter().map(|k| k.to_string()).collect();
        FraudDetector::new(&keywords, store).unwrap()
    }

    #[tokio::test]
    async fn test_high_risk_fraud_scenario() {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::default();
        let det = detector(store.clone());

        let outcome = det
            .analyze(
                "Your Visa card is suspended, verify account now",
                1,
                Some(-100),
                Some(&notifier),
            )
            .await;

        assert_eq!(outcome.analysis.brand_mentions, vec!["visa"]);
        assert_eq!(
            outcome.analysis.suspicious_patterns,
            vec![PatternKind::PhishingTerms, PatternKind::SocialEngineering]
        );
        // 0.2 + 0.6 + 0.4 co-occurrence + 0.2 urgency, clamped
        assert_eq!(outcome.analysis.suspicion_score, 1.0);

        assert_eq!(outcome.alerts.len(), 1);
        let alert = &outcome.alerts[0];
        assert_eq!(alert.alert_type, AlertType::HighRiskFraud);
        assert_eq!(
            alert.keywords,
            vec!["visa", "phishing_terms", "social_engineering"]
        );

        assert_eq!(store.alert_count(), 1);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, -100);
        assert!(sent[0].1.contains("FRAUD DETECTION ALERT"));
        assert!(sent[0].1.contains("CRITICAL"));
        assert!(sent[0].1.contains("\u{1F6A8}"));
    }

    #[tokio::test]
    async fn test_brand_info_scenario() {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::default();
        let det = detector(store.clone());

        let outcome = det
            .analyze(
                "I love using PayPal for payments",
                2,
                Some(-200),
                Some(&notifier),
            )
            .await;

        assert_eq!(outcome.analysis.brand_mentions, vec!["paypal"]);
        assert!(outcome.analysis.suspicious_patterns.is_empty());
        assert!((outcome.analysis.suspicion_score - 0.2).abs() < 1e-9);

        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].alert_type, AlertType::BrandMentionInfo);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("BRAND MENTION DETECTED"));
        assert!(!sent[0].1.contains("Severity"));
    }

    #[tokio::test]
    async fn test_patterns_only_at_threshold_no_alert() {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::default();
        let det = detector(store.clone());

        let outcome = det
            .analyze("4111-1111-1111-1111 cvv: 123", 3, Some(-300), Some(&notifier))
            .await;

        assert!(outcome.analysis.brand_mentions.is_empty());
        assert_eq!(
            outcome.analysis.suspicious_patterns,
            vec![PatternKind::CreditCardNumber, PatternKind::CvvCode]
        );
        // exactly 0.6 does not cross the strict threshold
        assert!((outcome.analysis.suspicion_score - 0.6).abs() < 1e-9);
        assert!(outcome.alerts.is_empty());
        assert_eq!(store.alert_count(), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patterns_above_threshold_suspicious_content() {
        let store = Arc::new(MemoryStore::new());
        let det = detector(store.clone());

        let outcome = det
            .analyze(
                "stolen fullz, card 4111-1111-1111-1111, cvv: 123, exp: 12/26",
                4,
                None,
                None,
            )
            .await;

        assert!(outcome.analysis.suspicion_score > 0.6);
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].alert_type, AlertType::SuspiciousContent);
        assert_eq!(store.alert_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_short_circuits() {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::default();
        let det = detector(store.clone());

        for text in ["", "   ", "\n\t"] {
            let outcome = det.analyze(text, 5, Some(-500), Some(&notifier)).await;
            assert!(outcome.alerts.is_empty());
            assert_eq!(outcome.analysis.suspicion_score, 0.0);
        }

        assert_eq!(store.alert_count(), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_drops_alert_but_returns_analysis() {
        let store = Arc::new(MemoryStore::failing_alerts());
        let notifier = RecordingNotifier::default();
        let det = detector(store.clone());

        let outcome = det
            .analyze(
                "Your Visa card is suspended, verify account now",
                6,
                Some(-600),
                Some(&notifier),
            )
            .await;

        assert!(outcome.alerts.is_empty());
        assert_eq!(outcome.analysis.brand_mentions, vec!["visa"]);
        assert_eq!(outcome.analysis.suspicion_score, 1.0);
        // notification only happens after successful persistence
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::failing();
        let det = detector(store.clone());

        let outcome = det
            .analyze(
                "Urgent: verify account for your mastercard",
                7,
                Some(-700),
                Some(&notifier),
            )
            .await;

        // the persisted alert is still reported despite the failed send
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(store.alert_count(), 1);
    }

    #[tokio::test]
    async fn test_no_notifier_no_destination() {
        let store = Arc::new(MemoryStore::new());
        let det = detector(store.clone());

        let outcome = det
            .analyze("stripe payment suspended, verify account", 8, None, None)
            .await;

        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(store.alert_count(), 1);
    }

    #[tokio::test]
    async fn test_analysis_is_deterministic() {
        let store = Arc::new(MemoryStore::new());
        let det = detector(store.clone());
        let text = "URGENT: your paypal account number: 12345 was hacked";

        let first = det.analyze(text, 9, None, None).await;
        let second = det.analyze(text, 9, None, None).await;

        assert_eq!(first.analysis, second.analysis);
        assert_eq!(first.alerts.len(), 1);
        assert_eq!(second.alerts.len(), 1);
    }

    #[test]
    fn test_classify_priority() {
        let brands = vec!["visa".to_string()];
        let patterns = vec![PatternKind::FraudTerms];

        assert_eq!(
            classify(0.9, &brands, &patterns),
            Some((AlertCategory::Fraud, AlertType::HighRiskFraud))
        );
        // both sets non-empty triggers the fraud path even at a low score
        assert_eq!(
            classify(0.3, &brands, &patterns),
            Some((AlertCategory::Fraud, AlertType::HighRiskFraud))
        );
        assert_eq!(
            classify(0.7, &[], &patterns),
            Some((AlertCategory::Fraud, AlertType::SuspiciousContent))
        );
        assert_eq!(
            classify(0.7, &brands, &[]),
            Some((AlertCategory::Fraud, AlertType::BrandMention))
        );
        // defensive fallback label for a score-only trigger with no signals
        assert_eq!(
            classify(0.7, &[], &[]),
            Some((AlertCategory::Fraud, AlertType::FraudDetection))
        );
        assert_eq!(
            classify(0.2, &brands, &[]),
            Some((AlertCategory::BrandInfo, AlertType::BrandMentionInfo))
        );
        assert_eq!(classify(0.6, &[], &patterns), None);
        assert_eq!(classify(0.0, &[], &[]), None);
    }

    #[test]
    fn test_emphasis_marker_tiers() {
        assert_eq!(emphasis_marker(AlertType::HighRiskFraud, 0.3), "\u{1F6A8}");
        assert_eq!(
            emphasis_marker(AlertType::SuspiciousContent, 0.95),
            "\u{1F6A8}"
        );
        assert_eq!(
            emphasis_marker(AlertType::SuspiciousContent, 0.75),
            "\u{26A0}\u{FE0F}"
        );
        assert_eq!(emphasis_marker(AlertType::BrandMention, 0.65), "\u{1F50D}");
    }

    #[test]
    fn test_fraud_warning_template() {
        let keywords = vec!["visa".to_string(), "fraud_terms".to_string()];
        let alert_ref = Uuid::new_v4();
        let warning = compose_warning(
            AlertCategory::Fraud,
            AlertType::HighRiskFraud,
            0.8,
            &keywords,
            &alert_ref,
        );

        assert!(warning.contains("Severity: HIGH"));
        assert!(warning.contains("Risk score: 0.8/1.0"));
        assert!(warning.contains("Alert type: High Risk Fraud"));
        assert!(warning.contains("visa, fraud_terms"));
        assert!(warning.contains(&alert_ref.to_string()));
    }
}
