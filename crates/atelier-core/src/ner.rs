//! Multilingual named-entity recognition via ONNX Runtime.
//!
//! Wraps a BERT token-classification model with the standard 9-label BIO
//! layout (O, B-PER, I-PER, B-ORG, I-ORG, B-LOC, I-LOC, B-MISC, I-MISC).
//! Only the span texts are kept; the pipeline treats entities as
//! candidate tags, not typed annotations.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::error::PipelineError;

/// The NER ONNX model filename.
const MODEL_FILENAME: &str = "model.onnx";

/// The tokenizer definition filename.
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Maximum input length in tokens. Titles never come close.
const MAX_SEQ_LEN: usize = 128;

/// B- labels in the 9-label BIO layout.
fn is_begin_label(id: usize) -> bool {
    matches!(id, 1 | 3 | 5 | 7)
}

/// I- labels in the 9-label BIO layout.
fn is_inside_label(id: usize) -> bool {
    matches!(id, 2 | 4 | 6 | 8)
}

/// Seam for substituting a test double for the ONNX recognizer.
pub trait EntityExtractor {
    /// Extract entity span texts from one title.
    fn extract(&self, text: &str) -> Result<Vec<String>, PipelineError>;
}

/// Multilingual named-entity recognizer.
pub struct EntityRecognizer {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

impl EntityRecognizer {
    /// Load the NER model from its model directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in `model_dir`. Like the
    /// sentence encoder, a load failure aborts the run.
    pub fn load(model_dir: &Path) -> Result<Self, PipelineError> {
        let model_path = model_dir.join(MODEL_FILENAME);
        let tokenizer_path = model_dir.join(TOKENIZER_FILENAME);

        if !model_path.exists() {
            return Err(PipelineError::ModelLoad {
                path: model_path,
                message: "NER model not found".to_string(),
            });
        }
        if !tokenizer_path.exists() {
            return Err(PipelineError::ModelLoad {
                path: tokenizer_path,
                message: "NER tokenizer not found".to_string(),
            });
        }

        tracing::info!("Loading NER model from {:?}", model_path);
        let session = Session::builder()
            .map_err(|e| PipelineError::ModelLoad {
                path: model_path.clone(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| PipelineError::ModelLoad {
                path: model_path.clone(),
                message: format!("Failed to load NER model: {e}"),
            })?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            PipelineError::ModelLoad {
                path: tokenizer_path,
                message: format!("Failed to load NER tokenizer: {e}"),
            }
        })?;

        tracing::info!("NER model loaded");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Run token classification and return per-token label IDs alongside
    /// the token strings.
    fn classify_tokens(&self, text: &str) -> Result<(Vec<usize>, Vec<String>), PipelineError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::inference("ner", format!("tokenization: {e}")))?;

        let raw_ids = encoding.get_ids();
        let raw_mask = encoding.get_attention_mask();
        let tokens: Vec<String> = encoding.get_tokens().to_vec();
        let seq_len = raw_ids.len().min(MAX_SEQ_LEN);
        if seq_len == 0 {
            return Ok((Vec::new(), tokens));
        }

        let input_ids: Vec<i64> = raw_ids[..seq_len].iter().map(|&x| x as i64).collect();
        let attention_mask: Vec<i64> = raw_mask[..seq_len].iter().map(|&x| x as i64).collect();
        let token_type_ids = vec![0i64; seq_len];

        let mut session = self
            .session
            .lock()
            .map_err(|e| PipelineError::inference("ner", format!("lock poisoned: {e}")))?;

        let shape = vec![1i64, seq_len as i64];
        let ids_value = Value::from_array((shape.clone(), input_ids))
            .map_err(|e| PipelineError::inference("ner", e))?;
        let mask_value = Value::from_array((shape.clone(), attention_mask))
            .map_err(|e| PipelineError::inference("ner", e))?;
        let types_value = Value::from_array((shape, token_type_ids))
            .map_err(|e| PipelineError::inference("ner", e))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_value,
                "attention_mask" => mask_value,
                "token_type_ids" => types_value
            ])
            .map_err(|e| PipelineError::inference("ner", e))?;

        let logits = outputs
            .iter()
            .find(|(name, _)| *name == "logits")
            .ok_or_else(|| PipelineError::inference("ner", "model did not produce logits"))?;

        let (_shape, data) = logits
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::inference("ner", e))?;

        // logits are [1, seq_len, num_labels]; argmax per token position
        let num_labels = data.len() / seq_len;
        let label_ids: Vec<usize> = (0..seq_len)
            .map(|i| {
                let slice = &data[i * num_labels..(i + 1) * num_labels];
                slice
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| idx)
                    .unwrap_or(0)
            })
            .collect();

        Ok((label_ids, tokens))
    }
}

impl EntityExtractor for EntityRecognizer {
    fn extract(&self, text: &str) -> Result<Vec<String>, PipelineError> {
        let (label_ids, tokens) = self.classify_tokens(text)?;
        Ok(bio_to_spans(&label_ids, &tokens))
    }
}

/// Assemble per-token BIO label IDs into entity span texts.
///
/// - Token 0 is `[CLS]` and the last is `[SEP]`; both are skipped.
/// - WordPiece continuation tokens (`##foo`) concatenate without a space.
/// - An I- label without a preceding B- starts a new span.
fn bio_to_spans(label_ids: &[usize], tokens: &[String]) -> Vec<String> {
    let mut spans: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    let end = label_ids.len().min(tokens.len()).saturating_sub(1);
    for i in 1..end {
        let label_id = label_ids[i];
        let token = tokens[i].as_str();

        if token.starts_with("##") {
            if let Some(ref mut span) = current {
                span.push_str(token.trim_start_matches('#'));
            }
            continue;
        }

        if is_begin_label(label_id) {
            if let Some(span) = current.take() {
                if !span.trim().is_empty() {
                    spans.push(span);
                }
            }
            current = Some(token.to_string());
        } else if is_inside_label(label_id) {
            match current {
                Some(ref mut span) => {
                    span.push(' ');
                    span.push_str(token);
                }
                None => current = Some(token.to_string()),
            }
        } else if let Some(span) = current.take() {
            if !span.trim().is_empty() {
                spans.push(span);
            }
        }
    }

    if let Some(span) = current {
        if !span.trim().is_empty() {
            spans.push(span);
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_bio_single_entity() {
        // [CLS] Jan de Vries [SEP] — B-PER I-PER I-PER
        let tokens = toks(&["[CLS]", "Jan", "de", "Vries", "[SEP]"]);
        let labels = vec![0, 1, 2, 2, 0];
        assert_eq!(bio_to_spans(&labels, &tokens), vec!["Jan de Vries"]);
    }

    #[test]
    fn test_bio_wordpiece_concatenation() {
        let tokens = toks(&["[CLS]", "Amster", "##dam", "[SEP]"]);
        let labels = vec![0, 5, 6, 0];
        assert_eq!(bio_to_spans(&labels, &tokens), vec!["Amsterdam"]);
    }

    #[test]
    fn test_bio_adjacent_entities_split_on_begin() {
        let tokens = toks(&["[CLS]", "Rembrandt", "Amsterdam", "[SEP]"]);
        let labels = vec![0, 1, 5, 0];
        assert_eq!(
            bio_to_spans(&labels, &tokens),
            vec!["Rembrandt", "Amsterdam"]
        );
    }

    #[test]
    fn test_bio_inside_without_begin_starts_span() {
        let tokens = toks(&["[CLS]", "Vermeer", "[SEP]"]);
        let labels = vec![0, 2, 0];
        assert_eq!(bio_to_spans(&labels, &tokens), vec!["Vermeer"]);
    }

    #[test]
    fn test_bio_outside_labels_yield_nothing() {
        let tokens = toks(&["[CLS]", "portret", "van", "een", "jongeman", "[SEP]"]);
        let labels = vec![0, 0, 0, 0, 0, 0];
        assert!(bio_to_spans(&labels, &tokens).is_empty());
    }

    #[test]
    fn test_bio_entity_flushed_at_sequence_end() {
        let tokens = toks(&["[CLS]", "Gent", "[SEP]"]);
        let labels = vec![0, 5, 0];
        assert_eq!(bio_to_spans(&labels, &tokens), vec!["Gent"]);
    }
}
