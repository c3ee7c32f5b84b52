//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BelgeError;

/// Main configuration for belge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BelgeConfig {
    /// External OCR configuration.
    pub ocr: OcrConfig,

    /// Pipeline execution configuration.
    pub pipeline: PipelineConfig,
}

/// External OCR program configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Program that reads an image on stdin and prints recognized text.
    pub command: String,

    /// Arguments passed before the language flag.
    pub args: Vec<String>,

    /// Recognition languages, passed as `-l <languages>` when non-empty.
    pub languages: String,

    /// Upper bound for a single recognition, in seconds.
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            args: vec!["stdin".to_string(), "stdout".to_string()],
            languages: "tur+eng".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OcrConfig {
    /// Timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full argument list for the OCR program.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        if !self.languages.is_empty() {
            args.push("-l".to_string());
            args.push(self.languages.clone());
        }
        args
    }
}

/// Pipeline execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of documents processed concurrently in batch mode.
    pub batch_jobs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { batch_jobs: 4 }
    }
}

impl BelgeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, BelgeError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BelgeError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), BelgeError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BelgeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), BelgeError> {
        if self.ocr.command.trim().is_empty() {
            return Err(BelgeError::Config("ocr.command must not be empty".to_string()));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(BelgeError::Config(
                "ocr.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.pipeline.batch_jobs == 0 {
            return Err(BelgeError::Config(
                "pipeline.batch_jobs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BelgeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_command_args_include_languages() {
        let config = OcrConfig::default();
        assert_eq!(config.command_args(), vec!["stdin", "stdout", "-l", "tur+eng"]);

        let config = OcrConfig {
            languages: String::new(),
            ..OcrConfig::default()
        };
        assert_eq!(config.command_args(), vec!["stdin", "stdout"]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BelgeConfig =
            serde_json::from_str(r#"{"ocr": {"timeout_secs": 5}}"#).unwrap();
        assert_eq!(config.ocr.timeout_secs, 5);
        assert_eq!(config.ocr.command, "tesseract");
        assert_eq!(config.pipeline.batch_jobs, 4);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = BelgeConfig::default();
        config.pipeline.batch_jobs = 0;
        assert!(matches!(config.validate(), Err(BelgeError::Config(_))));

        let mut config = BelgeConfig::default();
        config.ocr.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = BelgeConfig::default();
        config.ocr.command = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
