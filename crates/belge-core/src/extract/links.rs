//! Hyperlink extraction.

use super::patterns::URL_PATTERN;
use super::FieldExtractor;

/// URL extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkExtractor;

impl LinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for LinkExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        URL_PATTERN.find(text).map(|m| m.as_str().to_string())
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        URL_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Extract every URL from text, in order of appearance and including repeats.
pub fn extract_links(text: &str) -> Vec<String> {
    LinkExtractor::new().extract_all(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_links_in_order() {
        let text = "Web: https://example.com/a?b=1 ve http://test.org/x#y";
        assert_eq!(
            extract_links(text),
            vec!["https://example.com/a?b=1", "http://test.org/x#y"]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let text = "https://a.io https://b.io https://a.io";
        assert_eq!(
            extract_links(text),
            vec!["https://a.io", "https://b.io", "https://a.io"]
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(extract_links("HTTPS://Example.COM/Path"), vec!["HTTPS://Example.COM/Path"]);
        assert_eq!(extract_links("Http://x.y"), vec!["Http://x.y"]);
    }

    #[test]
    fn test_character_class_boundaries() {
        // Whitespace, quotes and angle brackets end a link
        assert_eq!(
            extract_links("<https://ex.com/p?q=[1]&r=(2)!>"),
            vec!["https://ex.com/p?q=[1]&r=(2)!"]
        );
        assert_eq!(
            extract_links("\"https://ex.com/%20a,b;c=d@e~f\""),
            vec!["https://ex.com/%20a,b;c=d@e~f"]
        );
        assert_eq!(extract_links("https://ex.com/path\nnext"), vec!["https://ex.com/path"]);
    }

    #[test]
    fn test_scheme_without_body_is_ignored() {
        assert!(extract_links("http:// nothing here").is_empty());
        assert!(extract_links("ftp://files.example.com").is_empty());
        assert!(extract_links("www.example.com").is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_links("").is_empty());
        assert_eq!(LinkExtractor::new().extract(""), None);
    }

    #[test]
    fn test_extract_returns_first() {
        let extractor = LinkExtractor::new();
        assert_eq!(
            extractor.extract("see http://one.com and http://two.com"),
            Some("http://one.com".to_string())
        );
    }
}
