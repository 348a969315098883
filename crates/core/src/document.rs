//! Core document and result types.
//!
//! A [`DocumentSnapshot`] is the pre-tokenized form of one corpus file: an
//! ordered list of sentences, each a list of token strings, plus an optional
//! aligned list of transliteration sentences. A [`Ref`] records one occurrence
//! of a term, and [`SearchResults`] is what a query hands back to callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// A sentence is an ordered sequence of tokens.
pub type Sentence = Vec<String>;

/// One tokenized corpus document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSnapshot {
    /// Stable document identifier (file basename).
    pub id: String,
    /// Sentences in file order.
    pub sentences: Vec<Sentence>,
    /// Transliteration sentences aligned with `sentences`; empty when the file
    /// carries no transliteration column.
    pub transliterations: Vec<Sentence>,
}

impl DocumentSnapshot {
    /// Creates a document without transliterations.
    pub fn new(id: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            id: id.into(),
            sentences,
            transliterations: Vec::new(),
        }
    }

    /// Attaches transliteration sentences aligned by sentence index.
    pub fn with_transliterations(mut self, transliterations: Vec<Sentence>) -> Self {
        self.transliterations = transliterations;
        self
    }

    /// Builds a document from string slices. Handy for tests and small callers.
    pub fn from_words(id: impl Into<String>, sentences: &[&[&str]]) -> Self {
        Self::new(
            id,
            sentences
                .iter()
                .map(|s| s.iter().map(|w| w.to_string()).collect())
                .collect(),
        )
    }

    /// Total number of tokens across all sentences.
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Vec::len).sum()
    }
}

/// Strips any directory prefix from a document identifier.
pub fn basename(id: &str) -> &str {
    Path::new(id)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(id)
}

/// One recorded occurrence of a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    /// Basename of the document containing the occurrence.
    pub doc: String,
    /// Index of the sentence within the document.
    pub sentence_index: usize,
    /// Full token list of the sentence.
    pub text: Sentence,
    /// Aligned transliteration sentence, if the document carried one.
    pub translit: Option<Sentence>,
}

/// Result of a term query.
///
/// `count` is the total occurrence count of all matched terms; `refs` holds the
/// capped example occurrences of each matched term, concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub terms: BTreeSet<String>,
    pub count: u64,
    pub refs: Vec<Ref>,
}

impl SearchResults {
    /// Returns `true` if no term matched.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
