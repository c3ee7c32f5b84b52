//! Rule-based signal extraction from recognized document text.

pub mod amounts;
pub mod classifier;
pub mod links;
pub mod patterns;

pub use amounts::{extract_amount, normalize_amount, AmountExtractor};
pub use classifier::{classify, DocumentClassifier};
pub use links::{extract_links, LinkExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the single best value from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
