//! Error types for the belge-core library.

use thiserror::Error;

/// Main error type for the belge library.
#[derive(Error, Debug)]
pub enum BelgeError {
    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The caller cancelled the invocation before OCR text became available.
    #[error("extraction cancelled")]
    Cancelled,
}

/// Errors reported by an OCR provider.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR backend is not installed or cannot be started.
    #[error("OCR backend unavailable: {0}")]
    Unavailable(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or contents.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Recognition did not finish in time.
    #[error("OCR timed out after {0} seconds")]
    Timeout(u64),
}

/// Result type for the belge library.
pub type Result<T> = std::result::Result<T, BelgeError>;
