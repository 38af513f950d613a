//! Terminal table output.
//!
//! Writes the reviewer-facing CSV with exactly the columns
//! `Artist Name, Artwork, Location, tags NL, tags EN`. All intermediate
//! stage fields are dropped here.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::PipelineError;
use crate::record::Record;

/// Separator between tags within a bucket column.
pub const TAG_SEPARATOR: &str = "; ";

/// One output row. Field order fixes the column order.
#[derive(Debug, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Artist Name")]
    pub artist: String,
    #[serde(rename = "Artwork")]
    pub artwork: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "tags NL")]
    pub tags_nl: String,
    #[serde(rename = "tags EN")]
    pub tags_en: String,
}

impl OutputRow {
    /// Project a record onto its terminal columns. Buckets are joined as
    /// they are; the fusion stage has already sorted and deduplicated.
    pub fn from_record(record: &Record) -> Self {
        Self {
            artist: record.artist.clone().unwrap_or_default(),
            artwork: record.title.clone(),
            location: record.location.clone().unwrap_or_default(),
            tags_nl: record.tags_nl.join(TAG_SEPARATOR),
            tags_en: record.tags_en.join(TAG_SEPARATOR),
        }
    }
}

/// Write the terminal table to `path`, preserving record order.
pub fn write_table(path: &Path, records: &[Record]) -> Result<(), PipelineError> {
    let file = std::fs::File::create(path).map_err(|e| PipelineError::Output {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_to(file, records).map_err(|message| PipelineError::Output {
        path: path.to_path_buf(),
        message,
    })
}

/// Write the terminal table to any writer.
pub fn write_to<W: Write>(writer: W, records: &[Record]) -> Result<(), String> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer
            .serialize(OutputRow::from_record(record))
            .map_err(|e| e.to_string())?;
    }
    csv_writer.flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partitioned_record(title: &str, tags_nl: &[&str], tags_en: &[&str]) -> Record {
        let mut record = Record::new(title, None, None);
        record.tags_nl = tags_nl.iter().map(|t| t.to_string()).collect();
        record.tags_en = tags_en.iter().map(|t| t.to_string()).collect();
        record
    }

    #[test]
    fn test_header_has_exact_columns() {
        let records = vec![partitioned_record("Zelfportret", &[], &[])];
        let mut buffer = Vec::new();
        write_to(&mut buffer, &records).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let header = output.lines().next().unwrap();
        assert_eq!(header, "Artist Name,Artwork,Location,tags NL,tags EN");
    }

    #[test]
    fn test_tags_joined_with_semicolon_space() {
        let records = vec![partitioned_record(
            "Portret van een jongeman",
            &["kunstwerk", "portret"],
            &[],
        )];
        let mut buffer = Vec::new();
        write_to(&mut buffer, &records).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("kunstwerk; portret"));
    }

    #[test]
    fn test_missing_optionals_serialize_empty() {
        let records = vec![partitioned_record("Stilleven", &[], &[])];
        let mut buffer = Vec::new();
        write_to(&mut buffer, &records).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let row = output.lines().nth(1).unwrap();
        assert_eq!(row, ",Stilleven,,,");
    }

    #[test]
    fn test_rows_preserve_record_order() {
        let records = vec![
            partitioned_record("B-titel", &[], &[]),
            partitioned_record("A-titel", &[], &[]),
        ];
        let mut buffer = Vec::new();
        write_to(&mut buffer, &records).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let rows: Vec<&str> = output.lines().skip(1).collect();
        assert!(rows[0].contains("B-titel"));
        assert!(rows[1].contains("A-titel"));
    }
}
