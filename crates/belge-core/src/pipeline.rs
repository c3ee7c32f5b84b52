//! Extraction pipeline combining link, amount and category extraction.

use std::time::Duration;

use tracing::{debug, info};

use crate::extract::{AmountExtractor, DocumentClassifier, FieldExtractor, LinkExtractor};
use crate::models::config::BelgeConfig;
use crate::models::document::ExtractionResult;

#[cfg(feature = "native")]
use {
    crate::error::{BelgeError, OcrError, Result},
    crate::ocr::OcrProvider,
    std::sync::Arc,
    std::time::Instant,
    tokio_util::sync::CancellationToken,
    tracing::warn,
};

/// Default upper bound for a single OCR call.
const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs every extractor over one recognized text.
///
/// The pipeline holds no per-document state; one instance can be shared
/// across threads and tasks.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    links: LinkExtractor,
    amounts: AmountExtractor,
    classifier: DocumentClassifier,
    ocr_timeout: Duration,
}

impl ExtractionPipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self {
            links: LinkExtractor::new(),
            amounts: AmountExtractor::new(),
            classifier: DocumentClassifier::new(),
            ocr_timeout: DEFAULT_OCR_TIMEOUT,
        }
    }

    /// Create a pipeline from configuration.
    pub fn from_config(config: &BelgeConfig) -> Self {
        Self::new().with_ocr_timeout(config.ocr.timeout())
    }

    /// Set the OCR timeout used by [`process_image`](Self::process_image).
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Extract links, amount and category from recognized text.
    ///
    /// Never fails: text without any signal yields empty links, no amount
    /// and the generic category.
    pub fn run(&self, text: &str) -> ExtractionResult {
        // wasm32-unknown-unknown has no clock; Instant::now() panics there
        #[cfg(feature = "native")]
        let start = Instant::now();

        info!("Extracting document signals from {} characters of text", text.len());

        let links = self.links.extract_all(text);
        debug!("Found {} links", links.len());

        let amount = self.amounts.extract(text);
        match &amount {
            Some(a) => debug!("Selected amount {}", a),
            None => debug!("No amount found"),
        }

        let classification = self.classifier.classify(text);

        debug!(
            "Classified as {:?} (confidence: {:.2})",
            classification.category,
            classification.confidence
        );

        #[cfg(feature = "native")]
        debug!("Extraction finished in {:?}", start.elapsed());

        ExtractionResult {
            raw_text: text.to_string(),
            links,
            amount,
            classification,
        }
    }
}

#[cfg(feature = "native")]
impl ExtractionPipeline {
    /// Recognize an image with `ocr`, then extract signals from its text.
    ///
    /// OCR failures and timeouts degrade to the empty result. Cancelling
    /// `cancel` before OCR text is available returns [`BelgeError::Cancelled`];
    /// once text is available extraction always runs to completion.
    pub async fn process_image(
        &self,
        ocr: Arc<dyn OcrProvider>,
        image: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<ExtractionResult> {
        let provider = ocr.name().to_string();
        let start = Instant::now();

        info!("Running OCR with {} on {} bytes", provider, image.len());

        // A blocking worker cannot be interrupted; on timeout or cancel its output is dropped.
        let task = tokio::task::spawn_blocking(move || ocr.recognize(&image));

        let text = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                info!("Extraction cancelled while waiting for {}", provider);
                return Err(BelgeError::Cancelled);
            }

            outcome = tokio::time::timeout(self.ocr_timeout, task) => match outcome {
                Ok(Ok(Ok(text))) => {
                    debug!("{} recognized {} characters in {:?}", provider, text.len(), start.elapsed());
                    text
                }
                Ok(Ok(Err(e))) => {
                    warn!("OCR with {} failed, continuing without text: {}", provider, e);
                    String::new()
                }
                Ok(Err(e)) => {
                    warn!("OCR worker for {} did not complete: {}", provider, e);
                    String::new()
                }
                Err(_) => {
                    let e = OcrError::Timeout(self.ocr_timeout.as_secs());
                    warn!("OCR with {} failed, continuing without text: {}", provider, e);
                    String::new()
                }
            },
        };

        Ok(self.run(&text))
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BelgeError, OcrError};
    use crate::models::document::{Amount, Category, Classification};
    use crate::ocr::OcrProvider;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct FixedOcr(&'static str);

    impl OcrProvider for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, _image: &[u8]) -> std::result::Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingOcr;

    impl OcrProvider for FailingOcr {
        fn name(&self) -> &str {
            "failing"
        }

        fn recognize(&self, _image: &[u8]) -> std::result::Result<String, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }
    }

    struct SlowOcr;

    impl OcrProvider for SlowOcr {
        fn name(&self) -> &str {
            "slow"
        }

        fn recognize(&self, _image: &[u8]) -> std::result::Result<String, OcrError> {
            std::thread::sleep(Duration::from_millis(300));
            Ok("Fatura 10,00 TL".to_string())
        }
    }

    fn assert_empty(result: &ExtractionResult) {
        assert!(result.links.is_empty());
        assert_eq!(result.amount, None);
        assert_eq!(result.classification, Classification::new(Category::Generic, 0.60));
    }

    #[test]
    fn test_run_invoice() {
        let text = "FATURA\nwww\nhttps://efatura.example.com/belge/42\nToplam: 1.234,56 TL\nKDV: 205,76 TL";
        let result = ExtractionPipeline::new().run(text);

        assert_eq!(result.raw_text, text);
        assert_eq!(result.links, vec!["https://efatura.example.com/belge/42"]);
        assert_eq!(result.amount, Some(Amount::new(1234.56, "TL")));
        assert_eq!(result.classification, Classification::new(Category::Invoice, 0.85));
    }

    #[test]
    fn test_run_business_card() {
        let text = "Ayşe Yılmaz\nGSM: 0532 000 00 00\nhttps://firma.com.tr";
        let result = ExtractionPipeline::new().run(text);

        assert_eq!(result.links, vec!["https://firma.com.tr"]);
        assert_eq!(result.amount, None);
        assert_eq!(result.classification.category, Category::BusinessCard);
    }

    #[test]
    fn test_run_empty_text() {
        let result = ExtractionPipeline::new().run("");
        assert_eq!(result.raw_text, "");
        assert_empty(&result);
        assert!(result.is_empty());
    }

    #[test]
    fn test_run_is_idempotent() {
        let pipeline = ExtractionPipeline::new();
        let text = "Invoice https://a.b/c https://a.b/c Total: 1,234.56 USD";
        assert_eq!(pipeline.run(text), pipeline.run(text));
    }

    #[test]
    fn test_concurrent_runs() {
        let pipeline = Arc::new(ExtractionPipeline::new());
        let expected = pipeline.run("Tutar 99,90 TL");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                std::thread::spawn(move || pipeline.run("Tutar 99,90 TL"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[cfg(feature = "native")]
    #[tokio::test]
    async fn test_process_image_uses_ocr_text() {
        let pipeline = ExtractionPipeline::new();
        let cancel = CancellationToken::new();

        let result = pipeline
            .process_image(Arc::new(FixedOcr("T.C. KIMLIK KARTI")), vec![1, 2, 3], &cancel)
            .await
            .unwrap();

        assert_eq!(result.raw_text, "T.C. KIMLIK KARTI");
        assert_eq!(result.classification, Classification::new(Category::IdentityDocument, 0.80));
    }

    #[cfg(feature = "native")]
    #[tokio::test]
    async fn test_process_image_degrades_on_ocr_error() {
        let pipeline = ExtractionPipeline::new();
        let cancel = CancellationToken::new();

        let result = pipeline
            .process_image(Arc::new(FailingOcr), Vec::new(), &cancel)
            .await
            .unwrap();

        assert_eq!(result.raw_text, "");
        assert_empty(&result);
    }

    #[cfg(feature = "native")]
    #[tokio::test]
    async fn test_process_image_degrades_on_timeout() {
        let pipeline = ExtractionPipeline::new().with_ocr_timeout(Duration::from_millis(20));
        let cancel = CancellationToken::new();

        let result = pipeline
            .process_image(Arc::new(SlowOcr), Vec::new(), &cancel)
            .await
            .unwrap();

        assert_empty(&result);
    }

    #[cfg(feature = "native")]
    #[tokio::test]
    async fn test_process_image_cancelled() {
        let pipeline = ExtractionPipeline::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pipeline
            .process_image(Arc::new(FixedOcr("Fatura")), Vec::new(), &cancel)
            .await;

        assert!(matches!(result, Err(BelgeError::Cancelled)));
    }

    #[test]
    fn test_from_config_uses_ocr_timeout() {
        let mut config = BelgeConfig::default();
        config.ocr.timeout_secs = 7;
        let pipeline = ExtractionPipeline::from_config(&config);
        assert_eq!(pipeline.ocr_timeout, Duration::from_secs(7));
    }
}
