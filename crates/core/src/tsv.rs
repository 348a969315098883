//! Reader for tokenized TSV annotation files.
//!
//! One token per row in the first column. A blank line, or a row whose first
//! cell is empty, closes the current sentence. A header row starts with
//! `TOKEN`; if its second cell is `ROMAN`, the second column of every
//! following row is the token's transliteration. Fields are split on tabs
//! with no quoting.

use crate::config::{ROMAN_HEADER, TOKEN_HEADER};
use crate::document::{basename, DocumentSnapshot, Sentence};
use crate::error::{Result, SearchError};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const TOKEN: usize = 0;
const TRANSLIT: usize = 1;

/// Read and tokenize one corpus file. The document id is the file's basename.
pub fn read_document(path: &Path) -> Result<DocumentSnapshot> {
    let file = File::open(path)?;
    let id = basename(&path.to_string_lossy()).to_string();
    parse_document(id, BufReader::new(file), path)
}

/// Tokenize TSV rows from `reader`. `path` is only used in error messages.
pub fn parse_document<R: BufRead>(
    id: impl Into<String>,
    reader: R,
    path: &Path,
) -> Result<DocumentSnapshot> {
    let mut sentences: Vec<Sentence> = Vec::new();
    let mut transliterations: Vec<Sentence> = Vec::new();
    let mut sentence: Sentence = Vec::new();
    let mut translit: Sentence = Vec::new();
    let mut translit_avail = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let row: Vec<&str> = if line.is_empty() {
            Vec::new()
        } else {
            line.split('\t').collect()
        };

        // sentence break
        if row.first().map_or(true, |cell| cell.is_empty()) {
            sentences.push(std::mem::take(&mut sentence));
            if translit_avail {
                transliterations.push(std::mem::take(&mut translit));
            }
            continue;
        }

        if row[TOKEN] == TOKEN_HEADER {
            if row.get(TRANSLIT) == Some(&ROMAN_HEADER) {
                translit_avail = true;
            }
            continue;
        }

        sentence.push(row[TOKEN].to_string());
        if translit_avail {
            let value = row.get(TRANSLIT).ok_or_else(|| SearchError::Tsv {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: "missing transliteration column".to_string(),
            })?;
            translit.push(value.to_string());
        }
    }

    // end of document sentence
    if !sentence.is_empty() {
        sentences.push(sentence);
        if translit_avail {
            transliterations.push(translit);
        }
    }

    Ok(DocumentSnapshot {
        id: id.into(),
        sentences,
        transliterations,
    })
}

/// Regular files directly inside `dir`, sorted by name. Hidden entries
/// (including the metadata directory) are skipped.
pub fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<DocumentSnapshot> {
        parse_document("doc", Cursor::new(text), Path::new("doc"))
    }

    #[test]
    fn test_sentences_split_on_blank_lines() {
        let doc = parse("Hello\tB-PER\nworld\tO\n\nBye\tO\n").unwrap();
        assert_eq!(
            doc.sentences,
            vec![vec!["Hello".to_string(), "world".to_string()], vec!["Bye".to_string()]]
        );
        assert!(doc.transliterations.is_empty());
    }

    #[test]
    fn test_header_skipped() {
        let doc = parse("TOKEN\tTAG\nhello\tO\n").unwrap();
        assert_eq!(doc.sentences, vec![vec!["hello".to_string()]]);
        assert!(doc.transliterations.is_empty());
    }

    #[test]
    fn test_roman_header_enables_transliteration() {
        let doc = parse("TOKEN\tROMAN\tTAG\nпривет\tprivet\tO\nмир\tmir\tO\n\nда\tda\tO").unwrap();
        assert_eq!(doc.sentences.len(), 2);
        assert_eq!(doc.transliterations.len(), 2);
        assert_eq!(doc.transliterations[0], vec!["privet".to_string(), "mir".to_string()]);
        assert_eq!(doc.transliterations[1], vec!["da".to_string()]);
    }

    #[test]
    fn test_empty_first_cell_breaks_sentence() {
        let doc = parse("a\tO\n\tO\nb\tO\n").unwrap();
        assert_eq!(doc.sentences.len(), 2);
    }

    #[test]
    fn test_blank_lines_keep_sentence_positions() {
        let doc = parse("a\tO\n\n\nb\tO\n").unwrap();
        assert_eq!(doc.sentences.len(), 3);
        assert!(doc.sentences[1].is_empty());
        assert_eq!(doc.sentences[2], vec!["b".to_string()]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = parse("a\tO\r\nb\tO\r\n").unwrap();
        assert_eq!(doc.sentences, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_missing_transliteration_is_error() {
        let err = parse("TOKEN\tROMAN\nhello\n").unwrap_err();
        match err {
            SearchError::Tsv { line, .. } => assert_eq!(line, 2),
            other => panic!("expected tsv error, got {other:?}"),
        }
    }

    #[test]
    fn test_corpus_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.tsv"), "x\n").unwrap();
        fs::write(dir.path().join("a.tsv"), "y\n").unwrap();
        fs::write(dir.path().join(".hidden"), "z\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let files = corpus_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.tsv", "b.tsv"]);
    }

    #[test]
    fn test_read_document_uses_basename() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc1.tsv");
        fs::write(&path, "hello\tO\n").unwrap();
        let doc = read_document(&path).unwrap();
        assert_eq!(doc.id, "doc1.tsv");
    }
}
