//! Corpus-derived stop words.
//!
//! The most frequent tokens of a corpus, stored as a JSON list in the
//! metadata directory. Used to keep function words out of top-word rankings.

use crate::config::STOP_WORDS_FILENAME;
use crate::error::Result;
use crate::tsv;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Lowercased token counts over every file in `data_dir`.
pub fn token_frequencies(data_dir: &Path) -> Result<HashMap<String, u64>> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for path in tsv::corpus_files(data_dir)? {
        let document = tsv::read_document(&path)?;
        for token in document.sentences.iter().flatten() {
            *counts.entry(token.to_lowercase()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// The `n` most frequent tokens, most frequent first; ties ordered by token.
pub fn most_common(counts: &HashMap<String, u64>, n: usize) -> Vec<String> {
    let mut ranked: Vec<(&String, &u64)> = counts.iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(token, _)| token.clone())
        .collect()
}

/// Compute the `n` most frequent tokens of the corpus in `data_dir`.
pub fn generate_stop_words(data_dir: &Path, n: usize) -> Result<Vec<String>> {
    let counts = token_frequencies(data_dir)?;
    let words = most_common(&counts, n);
    tracing::info!(
        "Selected {} stop words from {} distinct tokens in {:?}",
        words.len(),
        counts.len(),
        data_dir
    );
    Ok(words)
}

/// Write `words` as JSON into `metadata_dir`.
pub fn save_stop_words(metadata_dir: &Path, words: &[String]) -> Result<()> {
    fs::create_dir_all(metadata_dir)?;
    let path = metadata_dir.join(STOP_WORDS_FILENAME);
    fs::write(&path, serde_json::to_vec(words)?)?;
    tracing::info!("Saved {} stop words to {:?}", words.len(), path);
    Ok(())
}

/// Read the stop word list from `metadata_dir`; empty if none was saved.
pub fn load_stop_words(metadata_dir: &Path) -> Result<Vec<String>> {
    let path = metadata_dir.join(STOP_WORDS_FILENAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let words: Vec<String> = serde_json::from_slice(&fs::read(&path)?)?;
    Ok(words)
}
