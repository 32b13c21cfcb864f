//! Suspicion score calculation.

use super::patterns::PatternKind;

/// Decision threshold for the fraud path; strictly greater-than.
pub(crate) const HIGH_RISK_THRESHOLD: f64 = 0.6;

/// Urgency words checked by plain substring containment. Overlap with the
/// social-engineering pattern category is intentional and may double-count.
const URGENCY_WORDS: [&str; 4] = ["urgent", "immediate", "expire", "suspended"];

/// Combine signal counts into a bounded suspicion score.
///
/// Contributions: 0.2 per brand mention (capped at 2), 0.3 per matched
/// pattern category (capped at 3), a flat 0.4 when both signal sets are
/// non-empty, and a flat 0.2 when the lower-cased text contains an urgency
/// word. The sum is clamped to 1.0.
pub fn suspicion_score(
    brand_mentions: &[String],
    suspicious_patterns: &[PatternKind],
    text_lower: &str,
) -> f64 {
    let mut score = 0.0;

    score += brand_mentions.len().min(2) as f64 * 0.2;
    score += suspicious_patterns.len().min(3) as f64 * 0.3;

    if !brand_mentions.is_empty() && !suspicious_patterns.is_empty() {
        score += 0.4;
    }

    if URGENCY_WORDS.iter().any(|word| text_lower.contains(word)) {
        score += 0.2;
    }

    score.min(1.0)
}
