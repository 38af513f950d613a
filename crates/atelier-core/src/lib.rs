//! Atelier Core - Batch subject tagging for artwork catalogue records.
//!
//! Atelier enriches a catalogue table with controlled-vocabulary subject
//! tags in Dutch and English, derived from artwork titles:
//!
//! ```text
//! CSV → Classify → Vocabulary fallback → NER → Expand → Partition → CSV
//! ```
//!
//! A pretrained multi-label classifier proposes tags from the title
//! embedding; low-confidence titles fall back to nearest-neighbour
//! retrieval over the vocabulary terms; named entities and one-hop
//! broader terms round out the candidates before the language partition
//! splits them into `tags NL` and `tags EN` columns.
//!
//! # Usage
//!
//! ```rust,ignore
//! use atelier_core::{
//!     Config, EmbeddingEngine, EntityRecognizer, LinearClassifier, TagPipeline,
//! };
//! use atelier_core::vocabulary::{BroaderTermMap, Vocabulary};
//!
//! fn main() -> atelier_core::Result<()> {
//!     let config = Config::load()?;
//!     let embedder = EmbeddingEngine::load(
//!         &config.embedding_model_dir(),
//!         config.models.embed_batch_size,
//!     )?;
//!     let extractor = EntityRecognizer::load(&config.ner_model_dir())?;
//!     let classifier =
//!         LinearClassifier::load(&config.models.classifier, &config.models.labels)?;
//!     let vocabulary =
//!         Vocabulary::load(&config.vocabulary.en_terms, &config.vocabulary.nl_terms)?;
//!     let broader = BroaderTermMap::load(&config.vocabulary.broader_map)?;
//!
//!     let pipeline = TagPipeline::new(
//!         &embedder, &extractor, &classifier, &vocabulary, &broader, &config,
//!     );
//!     let summary = pipeline.run("./catalogue.csv".as_ref(), "./tagged.csv".as_ref())?;
//!     println!("Wrote {} record(s)", summary.records_written);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod classifier;
pub mod config;
pub mod embedding;
pub mod error;
pub mod langid;
pub mod math;
pub mod ner;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod vocabulary;

// Re-exports for convenient access
pub use classifier::LinearClassifier;
pub use config::Config;
pub use embedding::{EmbeddingEngine, TextEmbedder};
pub use error::{AtelierError, ConfigError, PipelineError, PipelineResult, Result};
pub use langid::TagLanguage;
pub use ner::{EntityExtractor, EntityRecognizer};
pub use pipeline::{PipelineState, RunSummary, TagPipeline};
pub use record::Record;
pub use vocabulary::{BroaderTermMap, Vocabulary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
