//! Core library for scanned document text extraction.
//!
//! This crate provides:
//! - Hyperlink extraction from recognized text
//! - Monetary amount extraction across Turkish and international formats
//! - Keyword-based document classification (invoice, ID, business card)
//! - An extraction pipeline that hands OCR off to a pluggable provider

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use error::{BelgeError, OcrError, Result};
pub use extract::{classify, extract_amount, extract_links, FieldExtractor};
pub use models::config::BelgeConfig;
pub use models::document::{
    Amount, Category, Classification, ConfidenceLevel, DocumentRecord, ExtractionResult,
};
pub use ocr::OcrProvider;
pub use pipeline::ExtractionPipeline;

#[cfg(feature = "native")]
/// Re-export so callers can cancel [`ExtractionPipeline::process_image`].
pub use tokio_util::sync::CancellationToken;
