//! Error types for the Atelier tag-enrichment pipeline.
//!
//! Errors are organized by concern so failures carry actionable context
//! (artifact paths, stage names, column names). Every pipeline error is
//! fatal: the run aborts without writing output. The single recovered
//! failure mode in the system — a candidate tag whose language cannot be
//! identified — is not an error at all; see [`crate::langid::identify`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Atelier operations.
#[derive(Error, Debug)]
pub enum AtelierError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors. All of these abort the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input table is missing required structure or has no usable rows
    #[error("Input error for {path}: {message}")]
    Input { path: PathBuf, message: String },

    /// A model artifact is missing or corrupt (fatal at startup)
    #[error("Failed to load model artifact {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    /// Embedding, classification, or NER inference failed on a batch
    #[error("Inference failed in {stage} stage: {message}")]
    Inference { stage: String, message: String },

    /// A term list or broader-term mapping is malformed
    #[error("Vocabulary error in {path}: {message}")]
    Vocabulary { path: PathBuf, message: String },

    /// Writing the terminal table failed
    #[error("Failed to write output {path}: {message}")]
    Output { path: PathBuf, message: String },
}

impl PipelineError {
    /// Shorthand for an inference error in a named stage.
    pub fn inference(stage: &str, message: impl std::fmt::Display) -> Self {
        Self::Inference {
            stage: stage.to_string(),
            message: message.to_string(),
        }
    }
}

/// Convenience type alias for Atelier results.
pub type Result<T> = std::result::Result<T, AtelierError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_include_path() {
        let err = PipelineError::ModelLoad {
            path: PathBuf::from("/models/classifier.json"),
            message: "unexpected end of file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/models/classifier.json"));
        assert!(msg.contains("unexpected end of file"));
    }

    #[test]
    fn test_inference_shorthand() {
        let err = PipelineError::inference("embedding", "tensor shape mismatch");
        assert!(err.to_string().contains("embedding stage"));
    }

    #[test]
    fn test_pipeline_error_converts_to_top_level() {
        let err: AtelierError = PipelineError::Input {
            path: PathBuf::from("records.csv"),
            message: "no title column".to_string(),
        }
        .into();
        assert!(matches!(err, AtelierError::Pipeline(_)));
    }
}
