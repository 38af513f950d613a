//! Controlled-vocabulary loading.
//!
//! Two flat, curator-maintained term lists (English and Dutch) plus a
//! directed narrower→broader term mapping. All three are single-purpose
//! CSV tables; a malformed table is fatal at startup.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::PipelineError;

/// Header of the term column in both vocabulary lists.
const TERM_COLUMN: &str = "term";

/// Headers of the broader-term mapping table.
const NARROWER_COLUMN: &str = "term";
const BROADER_COLUMN: &str = "broader_terms";

/// The two controlled-vocabulary term lists, indexed for case-insensitive
/// membership tests and ordered for deterministic pool construction.
#[derive(Debug)]
pub struct Vocabulary {
    /// English terms, lowercased and trimmed.
    en: HashSet<String>,
    /// Dutch terms, lowercased and trimmed.
    nl: HashSet<String>,
    /// All terms in file order (English list first), original casing,
    /// trimmed. May contain cross-list duplicates.
    terms: Vec<String>,
}

impl Vocabulary {
    /// Load both term lists.
    ///
    /// Each file is a CSV with a `term` header column; empty rows are
    /// skipped. Fails with a `Vocabulary` error on missing files, missing
    /// headers, or unreadable rows.
    pub fn load(en_path: &Path, nl_path: &Path) -> Result<Self, PipelineError> {
        let en_terms = read_term_column(en_path)?;
        let nl_terms = read_term_column(nl_path)?;

        let en: HashSet<String> = en_terms.iter().map(|t| t.to_lowercase()).collect();
        let nl: HashSet<String> = nl_terms.iter().map(|t| t.to_lowercase()).collect();

        let mut terms = en_terms;
        terms.extend(nl_terms);

        tracing::info!(
            "Loaded vocabulary: {} English terms, {} Dutch terms",
            en.len(),
            nl.len()
        );

        Ok(Self { en, nl, terms })
    }

    /// Whether a normalized (trimmed, lowercased) tag is an English term.
    pub fn contains_en(&self, normalized: &str) -> bool {
        self.en.contains(normalized)
    }

    /// Whether a normalized (trimmed, lowercased) tag is a Dutch term.
    pub fn contains_nl(&self, normalized: &str) -> bool {
        self.nl.contains(normalized)
    }

    /// Number of English terms.
    pub fn en_len(&self) -> usize {
        self.en.len()
    }

    /// Number of Dutch terms.
    pub fn nl_len(&self) -> usize {
        self.nl.len()
    }

    /// Build the deduplicated candidate pool for the similarity fallback.
    ///
    /// Terms from both lists, first-occurrence order, filtered to more
    /// than `min_len` characters. Order is deterministic so that
    /// similarity ties resolve identically across runs.
    pub fn candidate_pool(&self, min_len: usize) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.terms
            .iter()
            .filter(|t| t.chars().count() > min_len)
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }
}

/// Read the `term` column of a single-column CSV, trimming each value and
/// skipping empties.
fn read_term_column(path: &Path) -> Result<Vec<String>, PipelineError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| PipelineError::Vocabulary {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Vocabulary {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .clone();
    let term_idx = headers
        .iter()
        .position(|h| h.trim() == TERM_COLUMN)
        .ok_or_else(|| PipelineError::Vocabulary {
            path: path.to_path_buf(),
            message: format!("missing required column '{TERM_COLUMN}'"),
        })?;

    let mut terms = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| PipelineError::Vocabulary {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(value) = row.get(term_idx) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                terms.push(trimmed.to_string());
            }
        }
    }
    Ok(terms)
}

/// Directed narrower→broader term relation, exactly one hop.
///
/// Keys are lowercased narrower terms; values are the broader terms in
/// file order. The relation is not assumed acyclic or injective.
#[derive(Debug)]
pub struct BroaderTermMap {
    map: HashMap<String, Vec<String>>,
}

impl BroaderTermMap {
    /// Load the mapping table.
    ///
    /// Expects `term` and `broader_terms` header columns; the broader
    /// column holds semicolon-separated terms. Rows with an empty broader
    /// column are skipped.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| PipelineError::Vocabulary {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let headers = reader
            .headers()
            .map_err(|e| PipelineError::Vocabulary {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .clone();
        let narrower_idx = column_index(&headers, NARROWER_COLUMN, path)?;
        let broader_idx = column_index(&headers, BROADER_COLUMN, path)?;

        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for row in reader.records() {
            let row = row.map_err(|e| PipelineError::Vocabulary {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

            let narrower = row.get(narrower_idx).unwrap_or("").trim().to_lowercase();
            if narrower.is_empty() {
                continue;
            }

            let broader: Vec<String> = row
                .get(broader_idx)
                .unwrap_or("")
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if broader.is_empty() {
                continue;
            }

            map.insert(narrower, broader);
        }

        tracing::info!("Loaded broader-term map: {} narrower terms", map.len());
        Ok(Self { map })
    }

    /// One-hop lookup. The key must already be lowercased.
    pub fn broader(&self, narrower: &str) -> Option<&[String]> {
        self.map.get(narrower).map(Vec::as_slice)
    }

    /// Number of narrower terms in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Build a map directly from entries (for tests and callers that
    /// assemble the relation in memory).
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| {
                (
                    k.into().to_lowercase(),
                    v.into_iter().map(Into::into).collect(),
                )
            })
            .collect();
        Self { map }
    }
}

/// Find a required column index in a header row.
fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    path: &Path,
) -> Result<usize, PipelineError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| PipelineError::Vocabulary {
            path: path.to_path_buf(),
            message: format!("missing required column '{name}'"),
        })
}
