//! Primary classifier stage.
//!
//! Scores each title embedding against the pretrained multi-label
//! classifier and populates the `predicted` field.

use crate::classifier::LinearClassifier;
use crate::config::TaggingConfig;
use crate::error::PipelineError;
use crate::record::Record;

/// Populate `predicted` for every record.
///
/// `embeddings` must be aligned with `records` (one vector per title, in
/// record order) — the orchestrator embeds all titles once and shares
/// the result with the fallback stage.
pub fn run(
    records: &mut [Record],
    embeddings: &[Vec<f32>],
    classifier: &LinearClassifier,
    config: &TaggingConfig,
) -> Result<(), PipelineError> {
    if embeddings.len() != records.len() {
        return Err(PipelineError::inference(
            "classifier",
            format!(
                "embedding count {} does not match record count {}",
                embeddings.len(),
                records.len()
            ),
        ));
    }

    for (record, embedding) in records.iter_mut().zip(embeddings) {
        let probs = classifier.predict_proba(embedding)?;
        record.predicted =
            classifier.select_tags(&probs, config.confidence_threshold, config.max_tags);
    }
    Ok(())
}
