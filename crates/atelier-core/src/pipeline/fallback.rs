//! Vocabulary similarity fallback stage.
//!
//! Retrieves the nearest controlled-vocabulary terms for each title by
//! cosine similarity in the shared embedding space. The candidate pool
//! is embedded once per run; titles reuse the embeddings computed for
//! the classifier stage.

use crate::config::TaggingConfig;
use crate::embedding::TextEmbedder;
use crate::error::PipelineError;
use crate::math::cosine_similarity;
use crate::record::Record;
use crate::vocabulary::Vocabulary;

/// Populate `fallback` for every record.
pub fn run(
    records: &mut [Record],
    title_embeddings: &[Vec<f32>],
    embedder: &dyn TextEmbedder,
    vocabulary: &Vocabulary,
    config: &TaggingConfig,
) -> Result<(), PipelineError> {
    let pool = vocabulary.candidate_pool(config.min_term_len);
    if pool.is_empty() {
        tracing::warn!("Fallback candidate pool is empty; stage is a no-op");
        return Ok(());
    }
    tracing::debug!("Embedding {} fallback pool terms", pool.len());
    let pool_embeddings = embedder.encode(&pool)?;

    for (record, title_embedding) in records.iter_mut().zip(title_embeddings) {
        record.fallback = nearest_terms(
            title_embedding,
            &pool_embeddings,
            &pool,
            config.top_k,
            config.sim_threshold,
        );
    }
    Ok(())
}

/// The `top_k` nearest pool terms with similarity at or above the
/// threshold, in descending-similarity order. The sort is stable, so
/// similarity ties resolve to pool order.
fn nearest_terms(
    title_embedding: &[f32],
    pool_embeddings: &[Vec<f32>],
    pool: &[String],
    top_k: usize,
    sim_threshold: f32,
) -> Vec<String> {
    let mut scored: Vec<(usize, f32)> = pool_embeddings
        .iter()
        .map(|term_embedding| cosine_similarity(title_embedding, term_embedding))
        .enumerate()
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(top_k)
        .filter(|(_, sim)| *sim >= sim_threshold)
        .map(|(idx, _)| pool[idx].clone())
        .collect()
}
