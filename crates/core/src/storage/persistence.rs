//! Disk persistence for the inverted index using bincode serialization.
//!
//! The index is written as an explicit [`IndexSnapshot`] record list rather
//! than an opaque dump of in-memory structures, so the layout is stable and
//! inspectable. Writes use atomic temp-file + rename to prevent corruption on
//! crash. A CRC32 checksum is appended as a footer for integrity
//! verification: `[bincode payload][magic "DFX1"][u32 CRC32 BE]`.

use crate::config::{MAX_ENTRIES, SNAPSHOT_VERSION};
use crate::document::Ref;
use crate::error::{Result, SearchError};
use crate::index::{InvertedIndex, TermEntry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Magic bytes written before the CRC32 footer.
const SNAPSHOT_CRC_MAGIC: &[u8; 4] = b"DFX1";

/// Length of the `[magic][crc]` footer.
const FOOTER_LEN: usize = 8;

/// On-disk form of one term entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    pub count: u64,
    pub doc_count: u64,
    pub refs: Vec<Ref>,
}

/// On-disk form of a whole index. Terms are sorted by term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    pub num_documents: u64,
    pub terms: Vec<TermRecord>,
}

impl From<&InvertedIndex> for IndexSnapshot {
    fn from(index: &InvertedIndex) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            num_documents: index.num_documents,
            terms: index
                .terms
                .iter()
                .map(|(term, entry)| TermRecord {
                    term: term.clone(),
                    count: entry.count,
                    doc_count: entry.doc_count,
                    refs: entry.refs.clone(),
                })
                .collect(),
        }
    }
}

impl IndexSnapshot {
    /// Check per-term invariants after deserialization.
    ///
    /// A zero `doc_count` is accepted here and reported when the term is
    /// scored, see [`InvertedIndex::doc_count`].
    pub fn validate(&self) -> std::result::Result<(), String> {
        for record in &self.terms {
            if record.term != record.term.to_lowercase() {
                return Err(format!("term '{}' is not lowercase", record.term));
            }
            if record.refs.len() > MAX_ENTRIES {
                return Err(format!(
                    "term '{}' has {} refs (max {})",
                    record.term,
                    record.refs.len(),
                    MAX_ENTRIES
                ));
            }
            if record.doc_count > record.count {
                return Err(format!(
                    "term '{}' doc_count {} > count {}",
                    record.term, record.doc_count, record.count
                ));
            }
            if record.doc_count > self.num_documents {
                return Err(format!(
                    "term '{}' doc_count {} > num_documents {}",
                    record.term, record.doc_count, self.num_documents
                ));
            }
            let expected_refs = (record.count as usize).min(MAX_ENTRIES);
            if record.refs.len() != expected_refs {
                return Err(format!(
                    "term '{}' has {} refs, expected {}",
                    record.term,
                    record.refs.len(),
                    expected_refs
                ));
            }
        }
        Ok(())
    }

    fn into_index(self) -> InvertedIndex {
        InvertedIndex {
            terms: self
                .terms
                .into_iter()
                .map(|r| {
                    (
                        r.term,
                        TermEntry {
                            count: r.count,
                            doc_count: r.doc_count,
                            refs: r.refs,
                        },
                    )
                })
                .collect(),
            num_documents: self.num_documents,
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save an index to `path` with atomic write and CRC32 footer.
pub fn save_index(index: &InvertedIndex, path: &Path) -> Result<()> {
    let snapshot = IndexSnapshot::from(index);
    let bytes = bincode::serialize(&snapshot)?;

    // Compute CRC32 over the bincode payload
    let crc = crc32fast::hash(&bytes);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut output = Vec::with_capacity(bytes.len() + FOOTER_LEN);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(SNAPSHOT_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    // Atomic write: write to temp, then rename
    let tmp = tmp_path(path);
    fs::write(&tmp, &output)?;
    fs::rename(&tmp, path)?;

    tracing::info!(
        "Saved search index to {:?} ({} terms, {} documents, {} bytes, CRC32={:#010x})",
        path,
        snapshot.terms.len(),
        snapshot.num_documents,
        bytes.len(),
        crc
    );
    Ok(())
}

/// Load an index from `path`, verifying the CRC32 footer, version, and invariants.
pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    let raw = fs::read(path)?;

    if raw.len() < FOOTER_LEN || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_CRC_MAGIC {
        return Err(SearchError::CorruptIndex(format!(
            "{:?} has no checksum footer",
            path
        )));
    }
    let payload = &raw[..raw.len() - FOOTER_LEN];
    let stored_crc = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(SearchError::Checksum {
            expected: stored_crc,
            actual: computed_crc,
        });
    }
    tracing::debug!("Index CRC32 verified: {:#010x}", stored_crc);

    let snapshot: IndexSnapshot = bincode::deserialize(payload)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SearchError::IncompatibleSnapshot {
            expected: SNAPSHOT_VERSION,
            actual: snapshot.version,
        });
    }
    snapshot
        .validate()
        .map_err(|e| SearchError::CorruptIndex(format!("snapshot validation failed: {e}")))?;

    let index = snapshot.into_index();
    tracing::info!(
        "Loaded search index from {:?} ({} terms, {} documents)",
        path,
        index.num_terms(),
        index.num_documents()
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentSnapshot;
    use tempfile::TempDir;

    fn sample_index() -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        idx.add_document(
            &DocumentSnapshot::from_words("doc1", &[&["Hello", "world"], &["bye", "world"]])
                .with_transliterations(vec![
                    vec!["hallo".into(), "welt".into()],
                    vec!["tschuss".into(), "welt".into()],
                ]),
        );
        idx.add_document(&DocumentSnapshot::from_words("doc2", &[&["hello", "nurse"]]));
        idx
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta").join("inverted_index.bin");
        let idx = sample_index();
        save_index(&idx, &path).unwrap();
        assert!(!tmp_path(&path).exists());

        let loaded = load_index(&path).unwrap();
        assert_eq!(loaded, idx);
        let refs = &loaded.entry("hello").unwrap().refs;
        assert_eq!(refs[0].translit.as_ref().unwrap()[0], "hallo");
        assert!(refs[1].translit.is_none());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_index(&dir.path().join("nope.bin")).unwrap_err();
        match err {
            SearchError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_detects_bit_flip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inverted_index.bin");
        save_index(&sample_index(), &path).unwrap();

        let mut raw = fs::read(&path).unwrap();
        raw[4] ^= 0xFF;
        fs::write(&path, &raw).unwrap();

        let err = load_index(&path).unwrap_err();
        assert!(matches!(err, SearchError::Checksum { .. }));
        assert!(err.needs_rebuild());
    }

    #[test]
    fn test_load_rejects_missing_footer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inverted_index.bin");
        fs::write(&path, b"not an index").unwrap();
        assert!(matches!(
            load_index(&path),
            Err(SearchError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_validate_rejects_broken_invariants() {
        let mut snapshot = IndexSnapshot::from(&sample_index());
        assert!(snapshot.validate().is_ok());
        snapshot.terms[0].doc_count = snapshot.terms[0].count + 1;
        assert!(snapshot.validate().is_err());

        let mut snapshot = IndexSnapshot::from(&sample_index());
        snapshot.terms[0].refs.clear();
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inverted_index.bin");
        let mut snapshot = IndexSnapshot::from(&sample_index());
        snapshot.version = SNAPSHOT_VERSION + 1;
        let bytes = bincode::serialize(&snapshot).unwrap();
        let mut output = bytes.clone();
        output.extend_from_slice(SNAPSHOT_CRC_MAGIC);
        output.extend_from_slice(&crc32fast::hash(&bytes).to_be_bytes());
        fs::write(&path, output).unwrap();

        assert!(matches!(
            load_index(&path),
            Err(SearchError::IncompatibleSnapshot { .. })
        ));
    }
}
