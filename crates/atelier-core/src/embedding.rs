//! Multilingual sentence embeddings via ONNX Runtime.
//!
//! Loads a LaBSE-style BERT encoder (`model.onnx` + `tokenizer.json`) and
//! encodes text to L2-normalized 768-dimensional vectors aligned across
//! languages. Encoding is a pure function of model version and input;
//! batching bounds memory without affecting results.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;
use crate::math;

/// The encoder ONNX model filename.
const MODEL_FILENAME: &str = "model.onnx";

/// The tokenizer definition filename.
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Fixed sequence length. Artwork titles are short; padding to a fixed
/// length keeps results independent of batch composition.
const MAX_SEQ_LEN: usize = 64;

/// Seam for substituting a test double for the ONNX encoder.
pub trait TextEmbedder {
    /// Encode a batch of texts to one embedding vector each.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError>;
}

/// Engine for generating sentence embeddings.
pub struct EmbeddingEngine {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    embedding_dim: usize,
    batch_size: usize,
}

impl EmbeddingEngine {
    /// Load the sentence encoder from its model directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in `model_dir`. Failure
    /// here is fatal for the whole run; there is no retry.
    pub fn load(model_dir: &Path, batch_size: usize) -> Result<Self, PipelineError> {
        let model_path = model_dir.join(MODEL_FILENAME);
        let tokenizer_path = model_dir.join(TOKENIZER_FILENAME);

        if !model_path.exists() {
            return Err(PipelineError::ModelLoad {
                path: model_path,
                message: "sentence encoder not found".to_string(),
            });
        }
        if !tokenizer_path.exists() {
            return Err(PipelineError::ModelLoad {
                path: tokenizer_path,
                message: "tokenizer not found".to_string(),
            });
        }

        tracing::info!("Loading sentence encoder from {:?}", model_path);
        let session = Session::builder()
            .map_err(|e| PipelineError::ModelLoad {
                path: model_path.clone(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| PipelineError::ModelLoad {
                path: model_path.clone(),
                message: format!("Failed to load sentence encoder: {e}"),
            })?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            PipelineError::ModelLoad {
                path: tokenizer_path,
                message: format!("Failed to load tokenizer: {e}"),
            }
        })?;

        tracing::info!("Sentence encoder loaded");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            embedding_dim: 768,
            batch_size,
        })
    }

    /// Encode one batch-sized chunk of texts.
    fn encode_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let batch_size = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| PipelineError::inference("embedding", format!("tokenization: {e}")))?;

        // Flat BERT input tensors, zero-padded to the fixed length
        let mut input_ids = vec![0i64; batch_size * MAX_SEQ_LEN];
        let mut attention_mask = vec![0i64; batch_size * MAX_SEQ_LEN];
        let token_type_ids = vec![0i64; batch_size * MAX_SEQ_LEN];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            for (j, &id) in ids.iter().take(MAX_SEQ_LEN).enumerate() {
                input_ids[i * MAX_SEQ_LEN + j] = id as i64;
                attention_mask[i * MAX_SEQ_LEN + j] = 1;
            }
        }

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::inference("embedding", format!("lock poisoned: {e}")))?;

        let shape = vec![batch_size as i64, MAX_SEQ_LEN as i64];
        let ids_value = Value::from_array((shape.clone(), input_ids))
            .map_err(|e| PipelineError::inference("embedding", e))?;
        let mask_value = Value::from_array((shape.clone(), attention_mask))
            .map_err(|e| PipelineError::inference("embedding", e))?;
        let types_value = Value::from_array((shape, token_type_ids))
            .map_err(|e| PipelineError::inference("embedding", e))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_value,
                "attention_mask" => mask_value,
                "token_type_ids" => types_value
            ])
            .map_err(|e| PipelineError::inference("embedding", e))?;

        // pooler_output is the cross-lingual sentence embedding
        let pooler_output = outputs
            .iter()
            .find(|(name, _)| *name == "pooler_output")
            .ok_or_else(|| {
                PipelineError::inference("embedding", "encoder did not produce pooler_output")
            })?;

        let (_shape, data) = pooler_output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::inference("embedding", e))?;

        let embeddings: Vec<Vec<f32>> = data
            .chunks(self.embedding_dim)
            .map(math::l2_normalize)
            .collect();
        Ok(embeddings)
    }
}

impl TextEmbedder for EmbeddingEngine {
    /// Encode texts in configured-size batches.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_idx, chunk) in texts.chunks(self.batch_size).enumerate() {
            embeddings.extend(self.encode_chunk(chunk)?);

            let encoded = (batch_idx + 1) * self.batch_size;
            tracing::debug!("Embedded {}/{} texts", encoded.min(texts.len()), texts.len());
        }

        Ok(embeddings)
    }
}
