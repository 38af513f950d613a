//! Named-entity enrichment stage.
//!
//! Runs the recognizer over each title and records the deduplicated,
//! alphabetically ordered span texts. Spans of one character or less are
//! discarded as tokenizer noise.

use std::collections::BTreeSet;

use crate::error::PipelineError;
use crate::ner::EntityExtractor;
use crate::record::Record;

/// Populate `entities` for every record.
pub fn run(records: &mut [Record], extractor: &dyn EntityExtractor) -> Result<(), PipelineError> {
    for record in records.iter_mut() {
        let spans = extractor.extract(&record.title)?;

        let mut kept: BTreeSet<String> = BTreeSet::new();
        for span in spans {
            let span = span.trim();
            if span.chars().count() > 1 {
                kept.insert(span.to_string());
            }
        }
        record.entities = kept.into_iter().collect();
    }
    Ok(())
}
