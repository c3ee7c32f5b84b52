//! Keyword-based document classification.

use tracing::debug;

use crate::models::document::{Category, Classification};

/// Confidence assigned when no rule matches.
pub const GENERIC_CONFIDENCE: f32 = 0.60;

/// A classification rule: any keyword present assigns the category.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
    pub confidence: f32,
}

/// Rules in priority order. The first rule with a matching keyword wins.
pub const RULES: [ClassificationRule; 3] = [
    ClassificationRule {
        category: Category::Invoice,
        keywords: &["fatura", "invoice", "tutar", "toplam"],
        confidence: 0.85,
    },
    ClassificationRule {
        category: Category::IdentityDocument,
        keywords: &["tc", "kimlik", "t.c.", "doğum"],
        confidence: 0.80,
    },
    ClassificationRule {
        category: Category::BusinessCard,
        keywords: &["tel", "email", "@", "gsm"],
        confidence: 0.75,
    },
];

/// Document classifier over recognized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentClassifier;

impl DocumentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify text by case-insensitive keyword containment.
    pub fn classify(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();

        for rule in &RULES {
            if let Some(keyword) = rule.keywords.iter().find(|k| lower.contains(*k)) {
                debug!(
                    "Classified as {:?} by keyword {:?} (confidence: {:.2})",
                    rule.category, keyword, rule.confidence
                );
                return Classification::new(rule.category, rule.confidence);
            }
        }

        Classification::new(Category::Generic, GENERIC_CONFIDENCE)
    }
}

/// Classify text with the default rules.
pub fn classify(text: &str) -> Classification {
    DocumentClassifier::new().classify(text)
}
