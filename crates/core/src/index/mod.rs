//! Inverted search index: term dictionary, bounded occurrence lists, and
//! shell-style wildcard lookup.

/// Term → entry mapping with document-frequency accounting.
pub mod inverted_index;
/// Shell-style wildcard pattern compilation and matching.
pub mod wildcard;

pub use inverted_index::{InvertedIndex, TermEntry};
pub use wildcard::WildcardPattern;
