//! Brand keyword and suspicious pattern extraction.
//!
//! The pattern catalog is fixed: seven regex categories covering card data,
//! account identifiers, fraud jargon and phishing phrasing. Brand keywords
//! come from configuration and are matched as whole words.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ConfigError;

/// Category label contributed by a catalog pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    CreditCardNumber,
    CvvCode,
    ExpiryDate,
    BankAccount,
    FraudTerms,
    PhishingTerms,
    SocialEngineering,
}

impl PatternKind {
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::CreditCardNumber => "credit_card_number",
            PatternKind::CvvCode => "cvv_code",
            PatternKind::ExpiryDate => "expiry_date",
            PatternKind::BankAccount => "bank_account",
            PatternKind::FraudTerms => "fraud_terms",
            PatternKind::PhishingTerms => "phishing_terms",
            PatternKind::SocialEngineering => "social_engineering",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

struct SuspiciousPattern {
    kind: PatternKind,
    regex: Regex,
}

/// Fixed catalog, evaluated in this order. Each entry contributes its label
/// at most once per message.
static PATTERN_CATALOG: Lazy<Vec<SuspiciousPattern>> = Lazy::new(|| {
    [
        // 16-digit card number, optionally split into 4-digit groups
        (PatternKind::CreditCardNumber, r"\b(?:\d{4}[-\s]?){3}\d{4}\b"),
        (PatternKind::CvvCode, r"\bcvv\s*:?\s*\d{3,4}\b"),
        (
            PatternKind::ExpiryDate,
            r"\b(?:exp|expiry|expires?)\s*:?\s*\d{1,2}[/-]\d{2,4}\b",
        ),
        (
            PatternKind::BankAccount,
            r"\b(?:account\s+number|routing\s+number|iban|swift)\s*:?\s*\d+\b",
        ),
        (
            PatternKind::FraudTerms,
            r"\b(?:stolen|hacked|leaked|dump|fullz|cc|cvv2)\b",
        ),
        (
            PatternKind::PhishingTerms,
            r"\b(?:verify\s+account|update\s+payment|suspended\s+account)\b",
        ),
        (
            PatternKind::SocialEngineering,
            r"\b(?:urgent|immediate|expire|suspend|verify|click\s+here)\b",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| SuspiciousPattern {
        kind,
        regex: RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("invalid catalog pattern"),
    })
    .collect()
});

struct BrandKeyword {
    keyword: String,
    word_match: Regex,
}

/// Extracts brand mentions and suspicious pattern hits from message text.
///
/// Immutable after construction; safe to share across worker tasks.
pub struct SignalExtractor {
    keywords: Vec<BrandKeyword>,
}

impl SignalExtractor {
    /// Compile the configured brand keywords into whole-word matchers.
    ///
    /// Keywords are lower-cased and de-duplicated, keeping first occurrence
    /// order. An empty resulting set is a fatal configuration error.
    pub fn new(keywords: &[String]) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(keywords.len());

        for raw in keywords {
            let keyword = raw.trim().to_lowercase();
            if keyword.is_empty() || !seen.insert(keyword.clone()) {
                continue;
            }

            let pattern = format!(r"\b{}\b", regex::escape(&keyword));
            let word_match =
                Regex::new(&pattern).map_err(|source| ConfigError::InvalidKeyword {
                    keyword: keyword.clone(),
                    source,
                })?;

            compiled.push(BrandKeyword {
                keyword,
                word_match,
            });
        }

        if compiled.is_empty() {
            return Err(ConfigError::EmptyKeywordSet);
        }

        Ok(Self { keywords: compiled })
    }

    /// Number of configured brand keywords
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Brand keywords occurring as whole words in the lower-cased text.
    ///
    /// Each keyword is reported at most once, in configured order.
    pub fn brand_mentions(&self, text_lower: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|kw| kw.word_match.is_match(text_lower))
            .map(|kw| kw.keyword.clone())
            .collect()
    }

    /// Catalog categories matching anywhere in the raw text, in catalog
    /// order, each at most once.
    pub fn suspicious_patterns(&self, text: &str) -> Vec<PatternKind> {
        PATTERN_CATALOG
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.kind)
            .collect()
    }
}
