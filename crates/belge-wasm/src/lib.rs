//! WASM bindings for scanned document text extraction.
//!
//! OCR runs on the JavaScript side; these bindings take the recognized
//! text and return links, the main amount and the document category.

use js_sys::Array;
use wasm_bindgen::prelude::*;

use belge_core::{Category, ConfidenceLevel, DocumentRecord, ExtractionPipeline, FieldExtractor};
use belge_core::extract::{AmountExtractor, LinkExtractor};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract links, amount and category from recognized text.
#[wasm_bindgen]
pub fn extract(text: &str) -> Result<JsValue, JsValue> {
    let result = ExtractionPipeline::new().run(text);

    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract every http(s) link, in order of appearance.
#[wasm_bindgen]
pub fn extract_links(text: &str) -> Array {
    belge_core::extract_links(text)
        .into_iter()
        .map(JsValue::from)
        .collect()
}

/// Extract the largest amount as `{ value, currency }`, or `undefined`.
#[wasm_bindgen]
pub fn extract_amount(text: &str) -> Result<JsValue, JsValue> {
    match belge_core::extract_amount(text) {
        Some(amount) => {
            serde_wasm_bindgen::to_value(&amount).map_err(|e| JsValue::from_str(&e.to_string()))
        }
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Classify recognized text as `{ category, confidence }`.
#[wasm_bindgen]
pub fn classify(text: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&belge_core::classify(text))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Document extractor class for browser use.
#[wasm_bindgen]
pub struct DocumentExtractor {
    pipeline: ExtractionPipeline,
    links: LinkExtractor,
    amounts: AmountExtractor,
}

#[wasm_bindgen]
impl DocumentExtractor {
    /// Create a new document extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            pipeline: ExtractionPipeline::new(),
            links: LinkExtractor::new(),
            amounts: AmountExtractor::new(),
        }
    }

    /// Extract links, amount and category from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.pipeline.run(text))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Every amount candidate in pattern order, before the largest is picked.
    #[wasm_bindgen]
    pub fn amount_candidates(&self, text: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.amounts.extract_all(text))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Number of links in the text.
    #[wasm_bindgen]
    pub fn count_links(&self, text: &str) -> usize {
        self.links.extract_all(text).len()
    }

    /// Build a storage record (id, date, folder) as a JSON string.
    #[wasm_bindgen]
    pub fn to_record_json(&self, text: &str, image_path: Option<String>) -> Result<String, JsValue> {
        let record = DocumentRecord::from_extraction(&self.pipeline.run(text), image_path);

        serde_json::to_string(&record).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Category helpers for UI code.
#[wasm_bindgen]
pub struct CategoryInfo;

#[wasm_bindgen]
impl CategoryInfo {
    /// Display label for a category id such as "invoice".
    #[wasm_bindgen]
    pub fn label(category: &str) -> Option<String> {
        Category::from_str(category).map(|c| c.label().to_string())
    }

    /// Folder a category is filed into.
    #[wasm_bindgen]
    pub fn folder(category: &str) -> Option<String> {
        Category::from_str(category).map(|c| c.default_folder().to_string())
    }

    /// All category ids.
    #[wasm_bindgen]
    pub fn all() -> Array {
        Category::ALL
            .iter()
            .map(|c| JsValue::from_str(c.as_str()))
            .collect()
    }

    /// Confidence band ("high", "medium" or "low") for a score.
    #[wasm_bindgen]
    pub fn confidence_level(score: f32) -> String {
        ConfidenceLevel::from_score(score).as_str().to_string()
    }
}
