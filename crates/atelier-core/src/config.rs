//! Configuration management for Atelier.
//!
//! Configuration is loaded from the platform config directory
//! (e.g. `~/.config/atelier/config.toml` on Linux) with defaults matching
//! the production pipeline. Artifact paths can be overridden per-run from
//! the command line after loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Root configuration structure for Atelier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model artifact settings
    pub models: ModelsConfig,

    /// Vocabulary table settings
    pub vocabulary: VocabularyConfig,

    /// Tagging thresholds and limits
    pub tagging: TaggingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Model artifact settings.
///
/// All artifacts are pretrained, loaded read-only at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory where model artifacts are stored
    pub dir: PathBuf,

    /// Subdirectory of `dir` holding the multilingual sentence encoder
    /// (`model.onnx` + `tokenizer.json`)
    pub embedding_model: String,

    /// Subdirectory of `dir` holding the multilingual NER model
    /// (`model.onnx` + `tokenizer.json`)
    pub ner_model: String,

    /// Path to the serialized multi-label classifier weights (JSON)
    pub classifier: PathBuf,

    /// Path to the classifier's label set (JSON array of strings)
    pub labels: PathBuf,

    /// Batch size for embedding inference. A throughput knob only:
    /// results are identical regardless of batch size.
    pub embed_batch_size: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("~/.atelier/models"),
            embedding_model: "labse".to_string(),
            ner_model: "ner-multilingual".to_string(),
            classifier: PathBuf::from("classifier.json"),
            labels: PathBuf::from("labels.json"),
            embed_batch_size: 64,
        }
    }
}

/// Vocabulary table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Single-column CSV of English controlled-vocabulary terms
    pub en_terms: PathBuf,

    /// Single-column CSV of Dutch controlled-vocabulary terms
    pub nl_terms: PathBuf,

    /// Two-column CSV mapping narrower terms to semicolon-separated
    /// broader terms
    pub broader_map: PathBuf,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            en_terms: PathBuf::from("subject_terms_en.csv"),
            nl_terms: PathBuf::from("subject_terms_nl.csv"),
            broader_map: PathBuf::from("broader_terms.csv"),
        }
    }
}

/// Tagging thresholds and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// Header of the title column in the input table
    pub title_column: String,

    /// Minimum classifier probability for a label to be auto-included
    pub confidence_threshold: f32,

    /// Number of labels emitted when no label clears the threshold
    pub max_tags: usize,

    /// Number of nearest vocabulary terms retrieved per title in the
    /// similarity fallback
    pub top_k: usize,

    /// Minimum cosine similarity for a fallback term to be kept
    pub sim_threshold: f32,

    /// Vocabulary terms this length or shorter are excluded from the
    /// fallback candidate pool
    pub min_term_len: usize,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            title_column: "Artwork".to_string(),
            confidence_threshold: 0.25,
            max_tags: 5,
            top_k: 2,
            sim_threshold: 0.3,
            min_term_len: 4,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories, falling back to
    /// `~/.atelier/config.toml` if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("net", "atelier", "atelier")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".atelier").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.models.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Directory holding the sentence-encoder artifacts.
    pub fn embedding_model_dir(&self) -> PathBuf {
        self.model_dir().join(&self.models.embedding_model)
    }

    /// Directory holding the NER model artifacts.
    pub fn ner_model_dir(&self) -> PathBuf {
        self.model_dir().join(&self.models.ner_model)
    }

    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.models.embed_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "models.embed_batch_size must be > 0".into(),
            ));
        }
        if self.tagging.title_column.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tagging.title_column must not be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tagging.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "tagging.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.tagging.max_tags == 0 {
            return Err(ConfigError::ValidationError(
                "tagging.max_tags must be > 0".into(),
            ));
        }
        if self.tagging.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "tagging.top_k must be > 0".into(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.tagging.sim_threshold) {
            return Err(ConfigError::ValidationError(
                "tagging.sim_threshold must be between -1.0 and 1.0".into(),
            ));
        }
        Ok(())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tagging.title_column, "Artwork");
        assert_eq!(config.tagging.confidence_threshold, 0.25);
        assert_eq!(config.tagging.max_tags, 5);
        assert_eq!(config.tagging.top_k, 2);
        assert_eq!(config.tagging.sim_threshold, 0.3);
        assert_eq!(config.models.embed_batch_size, 64);
    }

    #[test]
    fn test_default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_to_toml() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[models]"));
        assert!(toml.contains("[tagging]"));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.models.embed_batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("embed_batch_size"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.tagging.confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_validate_rejects_empty_title_column() {
        let mut config = Config::default();
        config.tagging.title_column = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("title_column"));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tagging]\nmax_tags = 7\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tagging.max_tags, 7);
        // Unspecified sections fall back to defaults
        assert_eq!(config.tagging.confidence_threshold, 0.25);
        assert_eq!(config.models.embedding_model, "labse");
    }
}
