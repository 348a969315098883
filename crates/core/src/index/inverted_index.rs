//! Case-insensitive inverted index over tokenized documents.
//!
//! Maps lowercase terms to a [`TermEntry`]: total occurrence count, number of
//! distinct documents containing the term, and up to [`MAX_ENTRIES`] example
//! occurrences. Documents are identified by their basename.

use crate::config::MAX_ENTRIES;
use crate::document::{basename, DocumentSnapshot, Ref, SearchResults, Sentence};
use crate::error::{Result, SearchError};
use crate::index::wildcard::{has_wildcards, WildcardPattern};
use crate::storage::persistence;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Index entry for a single term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    /// Total occurrences across the corpus.
    pub count: u64,
    /// Number of distinct documents containing the term.
    pub doc_count: u64,
    /// First occurrences of the term, at most `MAX_ENTRIES`.
    pub refs: Vec<Ref>,
}

/// Inverted index mapping lowercase terms to their entries.
///
/// Not safe for concurrent writers; `IndexManager` builds into a private
/// instance and publishes it once complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    /// term → entry, ordered by term
    pub(crate) terms: BTreeMap<String, TermEntry>,
    /// Documents added since the last clear
    pub(crate) num_documents: u64,
}

impl InvertedIndex {
    /// Creates a new empty inverted index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document's sentences.
    ///
    /// `transliterations` is aligned with `sentences` by index and may be empty.
    /// Any directory prefix of `document_id` is stripped.
    pub fn add(&mut self, document_id: &str, sentences: &[Sentence], transliterations: &[Sentence]) {
        let doc = basename(document_id);
        self.num_documents += 1;

        let mut seen: HashSet<String> = HashSet::new();
        for (sentence_index, sentence) in sentences.iter().enumerate() {
            let translit = transliterations.get(sentence_index);
            for word in sentence {
                let term = word.to_lowercase();
                let entry = self.terms.entry(term.clone()).or_default();
                entry.count += 1;
                if entry.refs.len() < MAX_ENTRIES {
                    entry.refs.push(Ref {
                        doc: doc.to_string(),
                        sentence_index,
                        text: sentence.clone(),
                        translit: translit.cloned(),
                    });
                }
                seen.insert(term);
            }
        }

        // Document frequency: once per distinct term, not per occurrence
        for term in seen {
            if let Some(entry) = self.terms.get_mut(&term) {
                entry.doc_count += 1;
            }
        }
    }

    /// Index a tokenized document snapshot.
    pub fn add_document(&mut self, document: &DocumentSnapshot) {
        self.add(&document.id, &document.sentences, &document.transliterations);
    }

    /// Reset to an empty index.
    pub fn clear(&mut self) {
        self.terms.clear();
        self.num_documents = 0;
    }

    /// Number of documents added since the last clear.
    pub fn num_documents(&self) -> u64 {
        self.num_documents
    }

    /// Number of distinct terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.num_documents == 0
    }

    /// Iterate over all indexed terms in order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.keys().map(String::as_str)
    }

    /// Raw entry for a term (case-insensitive).
    pub fn entry(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(&term.to_lowercase())
    }

    /// Number of distinct documents containing `term`, or 0 if never indexed.
    ///
    /// An entry with a zero document count was written without document
    /// frequencies and cannot be scored; the index has to be rebuilt.
    pub fn doc_count(&self, term: &str) -> Result<u64> {
        let term = term.to_lowercase();
        match self.terms.get(&term) {
            Some(entry) if entry.doc_count == 0 => Err(SearchError::CorruptIndex(format!(
                "term '{term}' has no document count; delete {} in the metadata directory or rebuild",
                crate::config::INVERTED_INDEX_FILENAME
            ))),
            Some(entry) => Ok(entry.doc_count),
            None => Ok(0),
        }
    }

    /// Query the index.
    ///
    /// With `wildcards`, `term` is a shell-style pattern matched against every
    /// indexed term; counts are summed and refs concatenated in term order.
    pub fn retrieve(&self, term: &str, wildcards: bool) -> Result<SearchResults> {
        let term = term.to_lowercase();
        if wildcards && has_wildcards(&term) {
            let pattern = WildcardPattern::new(&term)?;
            Ok(self.retrieve_matching(&pattern))
        } else {
            Ok(self.lookup(&term))
        }
    }

    /// Exact, case-insensitive term lookup.
    pub fn lookup(&self, term: &str) -> SearchResults {
        let term = term.to_lowercase();
        let mut results = SearchResults::default();
        if let Some(entry) = self.terms.get(&term) {
            results.count = entry.count;
            results.refs = entry.refs.clone();
            results.terms.insert(term);
        }
        results
    }

    /// Aggregate every term matching a compiled wildcard pattern.
    pub fn retrieve_matching(&self, pattern: &WildcardPattern) -> SearchResults {
        let mut results = SearchResults::default();
        for (term, entry) in self.terms.iter().filter(|(t, _)| pattern.matches(t)) {
            results.terms.insert(term.clone());
            results.count += entry.count;
            results.refs.extend(entry.refs.iter().cloned());
        }
        tracing::debug!(
            "Wildcard '{}' matched {} of {} terms",
            pattern.as_str(),
            results.terms.len(),
            self.terms.len()
        );
        results
    }

    /// Persist the index to `path`. Best effort: failures are logged, not returned.
    pub fn save(&self, path: &Path) {
        if let Err(e) = persistence::save_index(self, path) {
            tracing::error!("Cannot save search index to {:?}: {}", path, e);
        }
    }

    /// Load an index previously written by [`InvertedIndex::save`].
    pub fn load(path: &Path) -> Result<Self> {
        persistence::load_index(path)
    }
}
