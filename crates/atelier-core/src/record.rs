//! Catalogue record data model.
//!
//! A [`Record`] is one row of the input table. Its identity is its row
//! position — records are kept in input order end-to-end. Each pipeline
//! stage appends its candidate field; prior fields are never overwritten.

/// One artwork row, mutated in place as it moves through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Artist name, passed through unchanged when present.
    pub artist: Option<String>,

    /// Artwork title. Never empty after ingestion: rows without a title
    /// are dropped before stage 1.
    pub title: String,

    /// Location, passed through unchanged when present.
    pub location: Option<String>,

    /// Classifier stage output (threshold path: label order;
    /// fallback path: descending probability).
    pub predicted: Vec<String>,

    /// Vocabulary similarity fallback output (descending similarity).
    pub fallback: Vec<String>,

    /// NER stage output (deduplicated, sorted alphabetically).
    pub entities: Vec<String>,

    /// Broader-term expansion output. Deliberately may contain
    /// duplicates; fusion resolves them.
    pub expanded: Vec<String>,

    /// Terminal English bucket (sorted, deduplicated).
    pub tags_en: Vec<String>,

    /// Terminal Dutch bucket (sorted, deduplicated).
    pub tags_nl: Vec<String>,
}

impl Record {
    /// Create a record from an input row.
    pub fn new(title: impl Into<String>, artist: Option<String>, location: Option<String>) -> Self {
        Self {
            artist,
            title: title.into(),
            location,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_empty_stage_fields() {
        let record = Record::new("Portret van een jongeman", None, None);
        assert_eq!(record.title, "Portret van een jongeman");
        assert!(record.predicted.is_empty());
        assert!(record.fallback.is_empty());
        assert!(record.entities.is_empty());
        assert!(record.expanded.is_empty());
        assert!(record.tags_en.is_empty());
        assert!(record.tags_nl.is_empty());
    }

    #[test]
    fn test_optional_fields_pass_through() {
        let record = Record::new(
            "Zelfportret",
            Some("Jan de Vries".to_string()),
            Some("Amsterdam".to_string()),
        );
        assert_eq!(record.artist.as_deref(), Some("Jan de Vries"));
        assert_eq!(record.location.as_deref(), Some("Amsterdam"));
    }
}
