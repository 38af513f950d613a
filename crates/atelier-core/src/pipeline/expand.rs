//! One-hop broader-term expansion.
//!
//! Every classifier and fallback tag is looked up in the broader-term
//! map; broader terms are appended after the originals, in the order of
//! the tags that produced them. Expansion is a single hop: broader terms
//! of broader terms are never chased.

use crate::record::Record;
use crate::vocabulary::BroaderTermMap;

/// Populate `expanded` for every record.
pub fn run(records: &mut [Record], map: &BroaderTermMap) {
    for record in records.iter_mut() {
        let originals: Vec<String> = record
            .predicted
            .iter()
            .chain(record.fallback.iter())
            .cloned()
            .collect();

        let mut expanded = originals.clone();
        for tag in &originals {
            if let Some(broader) = map.broader(&tag.to_lowercase()) {
                expanded.extend(broader.iter().cloned());
            }
        }
        record.expanded = expanded;
    }
}
