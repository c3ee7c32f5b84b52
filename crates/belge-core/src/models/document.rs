//! Document extraction data models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category assigned to a scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Invoice or receipt (fatura).
    Invoice,
    /// National identity card or similar (kimlik).
    IdentityDocument,
    /// Business card (kartvizit).
    BusinessCard,
    /// Anything no rule recognized.
    Generic,
}

impl Category {
    /// All categories in classifier priority order.
    pub const ALL: [Category; 4] = [
        Category::Invoice,
        Category::IdentityDocument,
        Category::BusinessCard,
        Category::Generic,
    ];

    /// Display label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Invoice => "Fatura",
            Self::IdentityDocument => "Kimlik",
            Self::BusinessCard => "Kartvizit",
            Self::Generic => "Doküman",
        }
    }

    /// Name of the default folder documents of this category are filed into.
    pub fn default_folder(&self) -> &'static str {
        match self {
            Self::Invoice => "Faturalar",
            Self::IdentityDocument => "Kimlikler",
            Self::BusinessCard => "Kartvizitler",
            Self::Generic => "Diğer",
        }
    }

    /// Parse from a category name or display label (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| {
            lower == c.label().to_lowercase()
                || lower == c.as_str()
        })
    }

    /// Stable machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::IdentityDocument => "identity_document",
            Self::BusinessCard => "business_card",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse confidence band used when presenting a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// 0.8 and above.
    High,
    /// 0.5 up to 0.8.
    Medium,
    /// Below 0.5.
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Result of document classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Assigned category.
    pub category: Category,
    /// Fixed heuristic confidence for the matched rule (0.0 - 1.0).
    pub confidence: f32,
}

impl Classification {
    pub fn new(category: Category, confidence: f32) -> Self {
        Self {
            category,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Confidence band for display.
    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }
}

/// A monetary amount with the currency token it was written with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    /// Parsed numeric value.
    pub value: f64,
    /// Currency token exactly as matched in the text (e.g. "TL", "₺", "USD").
    pub currency: String,
}

impl Amount {
    pub fn new(value: f64, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.currency)
    }
}

/// Everything extracted from one OCR text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Text the signals were extracted from.
    pub raw_text: String,

    /// URLs in order of appearance, repeats included.
    pub links: Vec<String>,

    /// Largest monetary amount found.
    pub amount: Option<Amount>,

    /// Document category.
    pub classification: Classification,
}

impl ExtractionResult {
    /// True when no extractor found anything and the classifier fell through.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
            && self.amount.is_none()
            && self.classification.category == Category::Generic
    }
}

/// Record handed to document storage after a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique document identifier.
    pub id: Uuid,

    /// Path of the stored page image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    /// Category display label.
    pub category: String,

    /// Classification confidence.
    pub confidence: f32,

    /// When the document was scanned.
    pub date: DateTime<Utc>,

    /// Folder the document is filed into.
    pub folder: String,

    /// User tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Recognized text, absent when OCR produced nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,

    #[serde(default)]
    pub detected_urls: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_currency: Option<String>,
}

impl DocumentRecord {
    /// Build a storage record from an extraction result.
    pub fn from_extraction(result: &ExtractionResult, image_path: Option<String>) -> Self {
        let category = result.classification.category;

        Self {
            id: Uuid::new_v4(),
            image_path,
            category: category.label().to_string(),
            confidence: result.classification.confidence,
            date: Utc::now(),
            folder: category.default_folder().to_string(),
            tags: Vec::new(),
            extracted_text: if result.raw_text.is_empty() {
                None
            } else {
                Some(result.raw_text.clone())
            },
            detected_urls: result.links.clone(),
            detected_amount: result.amount.as_ref().map(|a| a.value),
            detected_currency: result.amount.as_ref().map(|a| a.currency.clone()),
        }
    }

    /// Amount formatted for export metadata, when both parts are known.
    pub fn formatted_amount(&self) -> Option<String> {
        match (self.detected_amount, &self.detected_currency) {
            (Some(value), Some(currency)) => Some(Amount::new(value, currency.as_str()).to_string()),
            _ => None,
        }
    }
}
