//! Regex tables shared by the extractors, compiled once on first use.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // URL with http/https scheme (scheme is case-insensitive)
    pub static ref URL_PATTERN: Regex = Regex::new(
        r"(?i:https?)://[\w\-._~:/?#\[\]@!$&'()*+,;=%]+"
    ).unwrap();

    // Turkish grouping: 1.234,56 TL / 1.234,56 ₺
    pub static ref AMOUNT_TURKISH: Regex = Regex::new(
        r"(?i)(\d{1,3}(?:\.\d{3})*(?:,\d{2})?)\s*(TL|₺)"
    ).unwrap();

    // International grouping: 1,234.56 USD / 1,234.56 $
    pub static ref AMOUNT_INTERNATIONAL: Regex = Regex::new(
        r"(?i)(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)\s*(\$|USD|EUR|€)"
    ).unwrap();

    // Simple: 123.45 TL / 123,45 EUR
    pub static ref AMOUNT_SIMPLE: Regex = Regex::new(
        r"(?i)(\d+[.,]\d{2})\s*(TL|₺|\$|USD|EUR|€)"
    ).unwrap();

    // Keyword-prefixed: Toplam: 123,45 TL
    pub static ref AMOUNT_KEYWORD: Regex = Regex::new(
        r"(?i)(?:toplam|total|tutar|amount)[:\s]+(\d{1,3}(?:[.,]\d{3})*(?:[.,]\d{2})?)\s*(TL|₺|\$|USD|EUR|€)"
    ).unwrap();
}

/// Amount patterns in the order they are scanned.
pub fn amount_patterns() -> [&'static Regex; 4] {
    [
        &*AMOUNT_TURKISH,
        &*AMOUNT_INTERNATIONAL,
        &*AMOUNT_SIMPLE,
        &*AMOUNT_KEYWORD,
    ]
}
