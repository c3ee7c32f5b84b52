//! OCR collaborator interface.
//!
//! belge never recognizes text itself. Callers plug in an [`OcrProvider`]
//! (an external program, a platform API, a remote service) and the pipeline
//! runs it on a blocking worker before extracting signals from the text.

use std::sync::Arc;

use crate::error::OcrError;

/// Something that turns document image bytes into recognized text.
///
/// Implementations may block; the pipeline calls them off the async executor.
/// Returning an empty string is a valid "nothing recognized" answer.
pub trait OcrProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Recognize text in an encoded image.
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrProvider + ?Sized> OcrProvider for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

impl<T: OcrProvider + ?Sized> OcrProvider for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}
