//! Tag fusion and language partition.
//!
//! Concatenates the classifier, fallback, entity, and expansion outputs,
//! then routes each candidate to exactly one language bucket:
//! Dutch-vocabulary membership first, then English, then statistical
//! language identification. Candidates that resolve to neither language
//! are dropped without logging; they are expected noise, not errors.

use std::collections::HashSet;

use crate::langid::{self, TagLanguage};
use crate::record::Record;
use crate::vocabulary::Vocabulary;

/// Populate `tags_nl` and `tags_en` for every record.
///
/// A candidate is committed at most once per record, so the two buckets
/// never share a normalized tag even when a term appears in both
/// vocabularies. The candidate list runs classifier, fallback, entity,
/// then expansion output; since the first commit wins, casing is taken
/// from the earliest stage that produced the tag. Buckets come out
/// alphabetically sorted.
pub fn run(records: &mut [Record], vocabulary: &Vocabulary) {
    for record in records.iter_mut() {
        let mut committed: HashSet<String> = HashSet::new();
        let mut tags_nl = Vec::new();
        let mut tags_en = Vec::new();

        let candidates = record
            .predicted
            .iter()
            .chain(record.fallback.iter())
            .chain(record.entities.iter())
            .chain(record.expanded.iter());
        for candidate in candidates {
            let candidate = candidate.trim();
            if candidate.is_empty() {
                continue;
            }
            let normalized = candidate.to_lowercase();
            if committed.contains(&normalized) {
                continue;
            }

            let bucket = if vocabulary.contains_nl(&normalized) {
                Some(TagLanguage::Dutch)
            } else if vocabulary.contains_en(&normalized) {
                Some(TagLanguage::English)
            } else {
                langid::identify(candidate)
            };

            match bucket {
                Some(TagLanguage::Dutch) => tags_nl.push(candidate.to_string()),
                Some(TagLanguage::English) => tags_en.push(candidate.to_string()),
                None => continue,
            }
            committed.insert(normalized);
        }

        tags_nl.sort();
        tags_en.sort();
        record.tags_nl = tags_nl;
        record.tags_en = tags_en;
    }
}
