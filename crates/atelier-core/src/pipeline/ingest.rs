//! Input table ingestion with a typed, validated schema.
//!
//! The title column is required and validated once, up front; artist and
//! location columns are optional pass-throughs. Rows without a title are
//! dropped here, before any stage runs.

use std::path::Path;

use crate::error::PipelineError;
use crate::record::Record;

/// Header of the optional artist column.
pub const ARTIST_COLUMN: &str = "Artist Name";

/// Header of the optional location column.
pub const LOCATION_COLUMN: &str = "Location";

/// Read the input table into records, preserving row order.
///
/// Returns the usable records and the number of rows dropped for having
/// no title. Fails with an `Input` error when the title column is
/// missing or when the table yields no usable records.
pub fn read_records(
    path: &Path,
    title_column: &str,
) -> Result<(Vec<Record>, usize), PipelineError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| PipelineError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Input {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .clone();

    let title_idx = headers
        .iter()
        .position(|h| h.trim() == title_column)
        .ok_or_else(|| PipelineError::Input {
            path: path.to_path_buf(),
            message: format!("missing required title column '{title_column}'"),
        })?;
    let artist_idx = headers.iter().position(|h| h.trim() == ARTIST_COLUMN);
    let location_idx = headers.iter().position(|h| h.trim() == LOCATION_COLUMN);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for row in reader.records() {
        let row = row.map_err(|e| PipelineError::Input {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let title = row.get(title_idx).unwrap_or("").trim();
        if title.is_empty() {
            dropped += 1;
            continue;
        }

        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };
        records.push(Record::new(title, field(artist_idx), field(location_idx)));
    }

    if records.is_empty() {
        return Err(PipelineError::Input {
            path: path.to_path_buf(),
            message: "input contains no records with a title".to_string(),
        });
    }

    if dropped > 0 {
        tracing::warn!("Dropped {dropped} row(s) without a title");
    }
    Ok((records, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reads_all_columns() {
        let (_dir, path) = write_csv(
            "Artist Name,Artwork,Location\nJan de Vries,Portret van een jongeman,Amsterdam\n",
        );
        let (records, dropped) = read_records(&path, "Artwork").unwrap();

        assert_eq!(dropped, 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Portret van een jongeman");
        assert_eq!(records[0].artist.as_deref(), Some("Jan de Vries"));
        assert_eq!(records[0].location.as_deref(), Some("Amsterdam"));
    }

    #[test]
    fn test_missing_title_column_is_input_error() {
        let (_dir, path) = write_csv("Titel,Locatie\nPortret,Amsterdam\n");
        let err = read_records(&path, "Artwork").unwrap_err();
        assert!(matches!(err, PipelineError::Input { .. }));
        assert!(err.to_string().contains("Artwork"));
    }

    #[test]
    fn test_rows_without_title_are_dropped() {
        let (_dir, path) = write_csv(
            "Artist Name,Artwork\na,Zelfportret\nb,\nc,   \nd,Stilleven\n",
        );
        let (records, dropped) = read_records(&path, "Artwork").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(dropped, 2);
        assert_eq!(records[0].title, "Zelfportret");
        assert_eq!(records[1].title, "Stilleven");
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let (_dir, path) = write_csv("Artwork\nZelfportret\n");
        let (records, _) = read_records(&path, "Artwork").unwrap();
        assert!(records[0].artist.is_none());
        assert!(records[0].location.is_none());
    }

    #[test]
    fn test_empty_input_is_input_error() {
        let (_dir, path) = write_csv("Artwork\n");
        let err = read_records(&path, "Artwork").unwrap_err();
        assert!(matches!(err, PipelineError::Input { .. }));
    }

    #[test]
    fn test_order_preserved() {
        let (_dir, path) = write_csv("Artwork\nC\nA\nB\n");
        let (records, _) = read_records(&path, "Artwork").unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }
}
