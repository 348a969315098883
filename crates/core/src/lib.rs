//! # dragonfly-search-core
//!
//! Local full-text search over a corpus of tokenized TSV annotation files:
//! a case-insensitive inverted index with exact and wildcard term lookup,
//! TF-IDF word statistics per document, and on-disk persistence so the index
//! survives restarts.
//!
//! ```text
//! corpus dir → tsv reader → InvertedIndex::add (build) → snapshot file
//!            → IndexManager::retrieve (query) → DocumentStats (scoring)
//! ```
//!
//! Builds and loads run on a single background worker owned by
//! [`IndexManager`]; readers are never blocked by a rebuild.

/// Global configuration constants: limits, file names, and defaults.
pub mod config;
/// Document snapshots, occurrence refs, and query results.
pub mod document;
/// Error type shared by every module.
pub mod error;
/// Inverted index and wildcard matching.
pub mod index;
/// Background build/load orchestration for one corpus.
pub mod manager;
/// TF-IDF word scoring for a single document.
pub mod stats;
/// Corpus-derived stop word lists.
pub mod stop_words;
/// Storage layer: index snapshot persistence.
pub mod storage;
/// Reader for tokenized TSV corpus files.
pub mod tsv;

pub use document::{DocumentSnapshot, Ref, SearchResults, Sentence};
pub use error::{Result, SearchError};
pub use index::{InvertedIndex, TermEntry, WildcardPattern};
pub use manager::IndexManager;
pub use stats::DocumentStats;
