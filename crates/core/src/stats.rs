//! TF-IDF word statistics for a single document.
//!
//! Scores every distinct (lowercased) word of a document against a built
//! corpus index: `tf * ln(N / df)`, where `tf` is the raw in-document count,
//! `N` the number of indexed documents, and `df` the word's document count.
//! A word the index has never seen (the document changed after the last
//! build) scores 0.

use crate::document::DocumentSnapshot;
use crate::error::Result;
use crate::index::InvertedIndex;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

/// Per-document word scores derived from a corpus index.
#[derive(Debug, Clone)]
pub struct DocumentStats {
    index: Arc<InvertedIndex>,
    word_counts: HashMap<String, u64>,
    tfidf: HashMap<String, f64>,
}

impl DocumentStats {
    /// Count the document's words and score each against `index`.
    ///
    /// Fails with `CorruptIndex` if a word's index entry has no document count.
    pub fn new(document: &DocumentSnapshot, index: Arc<InvertedIndex>) -> Result<Self> {
        let mut word_counts: HashMap<String, u64> = HashMap::new();
        for word in document.sentences.iter().flatten() {
            *word_counts.entry(word.to_lowercase()).or_insert(0) += 1;
        }

        let mut tfidf = HashMap::with_capacity(word_counts.len());
        for (word, &tf) in &word_counts {
            let idf = idf_for(&index, word)?;
            tfidf.insert(word.clone(), tf as f64 * idf);
        }

        Ok(Self {
            index,
            word_counts,
            tfidf,
        })
    }

    /// TF-IDF score of `word`, or 0 if the document does not contain it.
    pub fn tfidf(&self, word: &str) -> f64 {
        self.tfidf.get(&word.to_lowercase()).copied().unwrap_or(0.0)
    }

    /// Inverse document frequency of `word` in the corpus, or 0 if unindexed.
    pub fn idf(&self, word: &str) -> Result<f64> {
        idf_for(&self.index, word)
    }

    /// Raw count of `word` in this document.
    pub fn word_count(&self, word: &str) -> u64 {
        self.word_counts
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct words in the document.
    pub fn num_words(&self) -> usize {
        self.word_counts.len()
    }

    /// The `n` highest-scoring words, descending by score.
    pub fn top_words(&self, n: usize) -> Vec<(String, f64)> {
        self.top_words_filtered(n, |_| true)
    }

    /// Like [`DocumentStats::top_words`], skipping any word in `stop_words`.
    pub fn top_words_excluding(&self, n: usize, stop_words: &HashSet<String>) -> Vec<(String, f64)> {
        self.top_words_filtered(n, |word| !stop_words.contains(word))
    }

    fn top_words_filtered<F>(&self, n: usize, keep: F) -> Vec<(String, f64)>
    where
        F: Fn(&str) -> bool,
    {
        if n == 0 {
            return Vec::new();
        }

        // Partial sort: O(w log n) via min-heap of size n
        let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, Reverse<&str>)>> =
            BinaryHeap::with_capacity(n + 1);
        for (word, &score) in self.tfidf.iter().filter(|(w, _)| keep(w.as_str())) {
            heap.push(Reverse((OrderedFloat(score), Reverse(word.as_str()))));
            if heap.len() > n {
                heap.pop();
            }
        }

        // Ascending heap order reversed: score descending, then word ascending
        heap.into_sorted_vec()
            .into_iter()
            .map(|Reverse((score, Reverse(word)))| (word.to_string(), score.0))
            .collect()
    }
}

fn idf_for(index: &InvertedIndex, word: &str) -> Result<f64> {
    let df = index.doc_count(word)?;
    if df == 0 {
        // uncounted word: the document was edited or added after the build
        return Ok(0.0);
    }
    Ok((index.num_documents() as f64 / df as f64).ln())
}
