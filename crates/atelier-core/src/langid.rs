//! Statistical language identification for the fusion stage.
//!
//! Wraps the `whatlang` trigram detector behind an explicit
//! `identify(text) -> Option<TagLanguage>` capability, so the fusion
//! stage's drop-on-failure path is a visible branch rather than a
//! swallowed exception.

use whatlang::Lang;

/// The two languages a tag can be committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLanguage {
    Dutch,
    English,
}

/// Inputs shorter than this (trimmed, in characters) carry no usable
/// trigram signal and are never identified.
const MIN_IDENTIFIABLE_CHARS: usize = 3;

/// Identify the language of a candidate tag.
///
/// Returns `None` when the text is too short, when the detector finds no
/// signal, or when it identifies a language other than Dutch or English.
/// `None` is the single recovered failure mode in the pipeline: the
/// caller drops the candidate silently.
pub fn identify(text: &str) -> Option<TagLanguage> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_IDENTIFIABLE_CHARS {
        return None;
    }

    match whatlang::detect(trimmed)?.lang() {
        Lang::Nld => Some(TagLanguage::Dutch),
        Lang::Eng => Some(TagLanguage::English),
        _ => None,
    }
}
