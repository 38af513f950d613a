//! Atelier CLI - Batch subject tagging for artwork catalogue records.
//!
//! Atelier reads a catalogue CSV, derives controlled-vocabulary subject
//! tags from the artwork titles, and writes an enriched CSV with `tags NL`
//! and `tags EN` columns.
//!
//! # Usage
//!
//! ```bash
//! # Tag a catalogue export
//! atelier catalogue.csv tagged.csv
//!
//! # Override artifact locations
//! atelier catalogue.csv tagged.csv \
//!     --classifier ./artifacts/classifier.json \
//!     --labels ./artifacts/labels.json \
//!     --nl-terms ./vocab/subject_terms_nl.csv \
//!     --en-terms ./vocab/subject_terms_en.csv
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use atelier_core::vocabulary::{BroaderTermMap, Vocabulary};
use atelier_core::{Config, EmbeddingEngine, EntityRecognizer, LinearClassifier, TagPipeline};

mod logging;

/// Atelier - Batch subject tagging for artwork catalogue records.
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input catalogue CSV
    input: PathBuf,

    /// Output CSV with tag columns appended
    output: PathBuf,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the embedding and NER model artifacts
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Serialized classifier weights (JSON)
    #[arg(long, value_name = "FILE")]
    classifier: Option<PathBuf>,

    /// Classifier label set (JSON array of strings)
    #[arg(long, value_name = "FILE")]
    labels: Option<PathBuf>,

    /// English vocabulary terms CSV
    #[arg(long, value_name = "FILE")]
    en_terms: Option<PathBuf>,

    /// Dutch vocabulary terms CSV
    #[arg(long, value_name = "FILE")]
    nl_terms: Option<PathBuf>,

    /// Broader-term map CSV
    #[arg(long, value_name = "FILE")]
    broader_map: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Fold command-line path overrides into the loaded configuration.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.model_dir {
            config.models.dir = dir.clone();
        }
        if let Some(path) = &self.classifier {
            config.models.classifier = path.clone();
        }
        if let Some(path) = &self.labels {
            config.models.labels = path.clone();
        }
        if let Some(path) = &self.en_terms {
            config.vocabulary.en_terms = path.clone();
        }
        if let Some(path) = &self.nl_terms {
            config.vocabulary.nl_terms = path.clone();
        }
        if let Some(path) = &self.broader_map {
            config.vocabulary.broader_map = path.clone();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: Failed to load config: {e}\n  Using default configuration.");
                Config::default()
            }
        },
    };
    cli.apply_overrides(&mut config);
    logging::init(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Atelier v{}", atelier_core::VERSION);

    let embedder = EmbeddingEngine::load(
        &config.embedding_model_dir(),
        config.models.embed_batch_size,
    )
    .context("failed to load the sentence encoder")?;
    let extractor =
        EntityRecognizer::load(&config.ner_model_dir()).context("failed to load the NER model")?;
    let classifier = LinearClassifier::load(&config.models.classifier, &config.models.labels)
        .context("failed to load the classifier")?;
    let vocabulary = Vocabulary::load(&config.vocabulary.en_terms, &config.vocabulary.nl_terms)
        .context("failed to load the vocabulary tables")?;
    let broader_map = BroaderTermMap::load(&config.vocabulary.broader_map)
        .context("failed to load the broader-term map")?;
    tracing::info!(
        "Vocabulary loaded: {} EN term(s), {} NL term(s), {} broader mapping(s)",
        vocabulary.en_len(),
        vocabulary.nl_len(),
        broader_map.len()
    );

    let pipeline = TagPipeline::new(
        &embedder,
        &extractor,
        &classifier,
        &vocabulary,
        &broader_map,
        &config,
    );
    let summary = pipeline.run(&cli.input, &cli.output)?;

    tracing::info!(
        "Tagged {} record(s) into {:?} ({} dropped)",
        summary.records_written,
        cli.output,
        summary.records_dropped
    );
    Ok(())
}
