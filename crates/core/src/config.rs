//! Global configuration constants for the corpus search index.
//!
//! All capacity limits, file names, and defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI
//! arguments and the `RUST_LOG` environment variable in the `dragonfly-search`
//! binary.

/// Maximum number of example occurrences (refs) kept per term.
///
/// Once a term has this many refs, further occurrences only bump its counters.
/// This bounds memory regardless of corpus size.
pub const MAX_ENTRIES: usize = 25;

/// File name of the persisted inverted index inside the metadata directory.
pub const INVERTED_INDEX_FILENAME: &str = "inverted_index.bin";

/// Name of the per-corpus metadata directory created inside the corpus directory.
pub const METADATA_DIR_NAME: &str = ".dragonfly";

/// File name of the generated stop word list inside the metadata directory.
pub const STOP_WORDS_FILENAME: &str = "stop_words.json";

/// Default number of words returned by a top-words ranking.
pub const DEFAULT_TOP_WORDS: usize = 20;

/// Default number of stop words generated from corpus token frequencies.
pub const DEFAULT_STOP_WORDS: usize = 500;

/// First-cell marker of a TSV header row.
pub const TOKEN_HEADER: &str = "TOKEN";

/// Second-cell marker of a TSV header row that enables transliteration alignment.
pub const ROMAN_HEADER: &str = "ROMAN";

/// Schema version written into every index snapshot.
///
/// Snapshots with a newer version are rejected on load.
pub const SNAPSHOT_VERSION: u32 = 1;
