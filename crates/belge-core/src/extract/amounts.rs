//! Monetary amount extraction across Turkish and international number formats.

use tracing::trace;

use super::patterns::amount_patterns;
use super::FieldExtractor;
use crate::models::document::Amount;

/// Amount field extractor.
///
/// Every pattern is scanned over the whole text. The selected amount is the
/// largest parsed value; on equal values the first candidate found keeps its
/// currency token.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = Amount;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let mut best: Option<Amount> = None;

        for candidate in self.extract_all(text) {
            match &best {
                Some(current) if candidate.value <= current.value => {}
                _ => best = Some(candidate),
            }
        }

        best
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for pattern in amount_patterns() {
            for caps in pattern.captures_iter(text) {
                let (Some(number), Some(currency)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };

                match normalize_amount(number.as_str()).parse::<f64>() {
                    Ok(value) => results.push(Amount::new(value, currency.as_str())),
                    Err(_) => trace!("Discarding unparsable amount {:?}", number.as_str()),
                }
            }
        }

        results
    }
}

/// Extract the largest monetary amount from text.
pub fn extract_amount(text: &str) -> Option<Amount> {
    AmountExtractor::new().extract(text)
}

/// Normalize a matched number to plain decimal notation.
///
/// With both separators present, the one that comes last is the decimal
/// separator: `1.234,56` and `1,234.56` both become `1234.56`. A lone comma
/// is always read as the decimal separator.
pub fn normalize_amount(s: &str) -> String {
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1.234,56"), "1234.56");
        assert_eq!(normalize_amount("1234,56"), "1234.56");
        assert_eq!(normalize_amount("1234.56"), "1234.56");
        assert_eq!(normalize_amount("1.234.567,89"), "1234567.89");
        assert_eq!(normalize_amount("1,234.56"), "1234.56");
        assert_eq!(normalize_amount("1,234,567.89"), "1234567.89");
        assert_eq!(normalize_amount("1,234"), "1.234");
        assert_eq!(normalize_amount("150"), "150");
    }

    #[test]
    fn test_turkish_total() {
        let amount = extract_amount("Toplam: 1.234,56 TL").unwrap();
        assert_eq!(amount, Amount::new(1234.56, "TL"));
    }

    #[test]
    fn test_international_total() {
        let amount = extract_amount("Total: 1,234.56 USD").unwrap();
        assert_eq!(amount, Amount::new(1234.56, "USD"));
    }

    #[test]
    fn test_largest_amount_wins() {
        let text = "Ara toplam 12.00 TL\nKDV 2.16 TL\nGenel 50.00 TL";
        let amount = extract_amount(text).unwrap();
        assert_eq!(amount.value, 50.0);
        assert_eq!(amount.currency, "TL");
    }

    #[test]
    fn test_lira_symbol_and_euro() {
        assert_eq!(extract_amount("Fiyat 249,90 ₺"), Some(Amount::new(249.9, "₺")));
        assert_eq!(extract_amount("Price 19.99 €"), Some(Amount::new(19.99, "€")));
        assert_eq!(extract_amount("Due 5.00$"), Some(Amount::new(5.0, "$")));
    }

    #[test]
    fn test_tie_keeps_first_currency() {
        // Both candidates are 10.00; the Turkish pattern is scanned first
        let text = "10,00 TL veya 10.00 EUR";
        assert_eq!(extract_amount(text), Some(Amount::new(10.0, "TL")));
    }

    #[test]
    fn test_currency_token_is_literal() {
        assert_eq!(extract_amount("odenen 75,50 tl"), Some(Amount::new(75.5, "tl")));
        assert_eq!(extract_amount("paid 3.50 usd"), Some(Amount::new(3.5, "usd")));
    }

    #[test]
    fn test_whole_number_with_currency() {
        assert_eq!(extract_amount("Bilet 150 TL"), Some(Amount::new(150.0, "TL")));
        assert_eq!(extract_amount("Fee 1,500 USD"), Some(Amount::new(1.5, "USD")));
    }

    #[test]
    fn test_no_currency_no_amount() {
        assert_eq!(extract_amount("Toplam 1.234,56"), None);
        assert_eq!(extract_amount("Tel: 0532 123 45 67"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn test_unparsable_candidate_is_skipped() {
        // Arabic-Indic digits match \d but do not parse as f64
        let text = "١٢٣,٤٥ TL ve 7,25 TL";
        assert_eq!(extract_amount(text), Some(Amount::new(7.25, "TL")));
    }

    #[test]
    fn test_extract_all_reports_every_pattern() {
        let extractor = AmountExtractor::new();
        let all = extractor.extract_all("Toplam: 1.234,56 TL");

        // Turkish, simple ("234,56 TL") and keyword patterns all match
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], Amount::new(1234.56, "TL"));
        assert_eq!(all[1], Amount::new(234.56, "TL"));
        assert_eq!(all[2], Amount::new(1234.56, "TL"));
    }

    #[test]
    fn test_keyword_pattern_alone_reads_turkish_grouping_in_usd() {
        // Only the keyword pattern sees the whole number; the others stop at "56" and "234,56"
        let extractor = AmountExtractor::new();
        let text = "Amount: 1.234,56 USD";

        assert_eq!(
            extractor.extract_all(text),
            vec![
                Amount::new(56.0, "USD"),
                Amount::new(234.56, "USD"),
                Amount::new(1234.56, "USD"),
            ]
        );
        assert_eq!(extract_amount(text), Some(Amount::new(1234.56, "USD")));
    }
}
