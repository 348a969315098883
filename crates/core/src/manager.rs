//! Index lifecycle for one corpus directory.
//!
//! [`IndexManager`] owns the published [`InvertedIndex`] for a corpus and a
//! single background worker thread that runs every load and build, one at a
//! time, in submission order. Synchronous calls go through the same queue and
//! wait for their result, so there is never more than one writer.
//!
//! Builds happen in a private index that is only published (an `Arc` swap)
//! after it is complete. Readers hold an `Arc` snapshot and see either the old
//! or the new index, never a partially built one.

use crate::config::INVERTED_INDEX_FILENAME;
use crate::document::{DocumentSnapshot, SearchResults};
use crate::error::{Result, SearchError};
use crate::index::InvertedIndex;
use crate::stats::DocumentStats;
use crate::tsv;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
enum Task {
    Load { build_if_missing: bool },
    Build,
    Barrier,
}

/// A unit of work for the index worker. `reply` is set for synchronous callers.
struct Job {
    task: Task,
    reply: Option<Sender<Result<()>>>,
}

/// State shared between the manager handle and its worker.
struct Shared {
    data_dir: PathBuf,
    index_path: PathBuf,
    index: RwLock<Arc<InvertedIndex>>,
    loaded: AtomicBool,
}

impl Shared {
    fn publish(&self, index: InvertedIndex) {
        *self.index.write() = Arc::new(index);
        self.loaded.store(true, Ordering::Release);
    }

    fn run(&self, task: Task) -> Result<()> {
        match task {
            Task::Load { build_if_missing } => {
                if build_if_missing && !self.index_path.exists() {
                    self.build()
                } else {
                    self.load()
                }
            }
            Task::Build => self.build(),
            Task::Barrier => Ok(()),
        }
    }

    fn load(&self) -> Result<()> {
        match InvertedIndex::load(&self.index_path) {
            Ok(index) => {
                self.publish(index);
                Ok(())
            }
            Err(SearchError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No search index created yet at {:?}", self.index_path);
                self.loaded.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Cannot load search index {:?}: {}", self.index_path, e);
                self.loaded.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    fn build(&self) -> Result<()> {
        let start = Instant::now();
        tracing::info!("Building the search index for {:?}", self.data_dir);

        // Build privately; the published index stays live until the swap.
        let mut index = InvertedIndex::new();
        for path in tsv::corpus_files(&self.data_dir)? {
            let document = tsv::read_document(&path).map_err(|e| {
                tracing::error!("Search index build aborted at {:?}: {}", path, e);
                e
            })?;
            tracing::debug!(
                "Indexing {} ({} sentences, {} tokens)",
                document.id,
                document.sentences.len(),
                document.token_count()
            );
            index.add_document(&document);
        }

        index.save(&self.index_path);
        tracing::info!(
            "Completed the search index for {:?}: {} documents, {} terms in {:.2?}",
            self.data_dir,
            index.num_documents(),
            index.num_terms(),
            start.elapsed()
        );
        self.publish(index);
        Ok(())
    }
}

fn worker_loop(rx: Receiver<Job>, shared: Arc<Shared>) {
    while let Ok(job) = rx.recv() {
        let result = shared.run(job.task);
        match job.reply {
            Some(reply) => {
                let _ = reply.send(result);
            }
            None => {
                if let Err(e) = result {
                    tracing::error!("Background index task {:?} failed: {}", job.task, e);
                }
            }
        }
    }
    tracing::debug!("Index worker stopped");
}

/// Owns the search index of one corpus and its background worker.
///
/// Dropping the manager lets queued tasks finish, then joins the worker.
pub struct IndexManager {
    shared: Arc<Shared>,
    metadata_dir: PathBuf,
    submit_tx: Option<Sender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl IndexManager {
    /// Create a manager for the corpus in `data_dir`, persisting its index in
    /// `metadata_dir`. Spawns the worker thread; nothing is loaded yet.
    pub fn new(data_dir: impl Into<PathBuf>, metadata_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let metadata_dir = metadata_dir.into();
        let shared = Arc::new(Shared {
            index_path: metadata_dir.join(INVERTED_INDEX_FILENAME),
            data_dir,
            index: RwLock::new(Arc::new(InvertedIndex::new())),
            loaded: AtomicBool::new(false),
        });

        let (submit_tx, submit_rx) = channel::unbounded::<Job>();
        let task_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("index-worker".to_string())
            .spawn(move || worker_loop(submit_rx, task_shared))?;

        Ok(Self {
            shared,
            metadata_dir,
            submit_tx: Some(submit_tx),
            worker: Some(worker),
        })
    }

    /// Corpus directory being indexed.
    pub fn data_dir(&self) -> &Path {
        &self.shared.data_dir
    }

    /// Directory holding the persisted index and other corpus metadata.
    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    /// Path of the persisted index file.
    pub fn index_path(&self) -> &Path {
        &self.shared.index_path
    }

    /// Whether a usable index is in memory.
    pub fn is_loaded(&self) -> bool {
        self.shared.loaded.load(Ordering::Acquire)
    }

    /// Snapshot of the currently published index.
    pub fn index(&self) -> Arc<InvertedIndex> {
        Arc::clone(&self.shared.index.read())
    }

    /// Number of documents in the published index.
    pub fn num_documents(&self) -> u64 {
        self.index().num_documents()
    }

    /// Load the persisted index, building it first if `build_if_missing` and
    /// no index file exists.
    ///
    /// With `background`, the task is queued and this returns immediately.
    /// Otherwise it blocks until the task has run. A missing index file is not
    /// an error; it leaves the manager unloaded.
    pub fn load_index(&self, background: bool, build_if_missing: bool) -> Result<()> {
        self.submit(Task::Load { build_if_missing }, background)
    }

    /// Rebuild the index from every file in the corpus directory, persist it,
    /// and publish it.
    ///
    /// With `background`, the build is queued and this returns immediately.
    /// A failed build leaves the previously published index in place.
    pub fn build_index(&self, background: bool) -> Result<()> {
        self.submit(Task::Build, background)
    }

    /// Block until every task queued before this call has finished.
    pub fn wait_idle(&self) -> Result<()> {
        self.submit(Task::Barrier, false)
    }

    /// Query the published index. Returns empty results while unloaded.
    pub fn retrieve(&self, term: &str, wildcards: bool) -> Result<SearchResults> {
        if !self.is_loaded() {
            return Ok(SearchResults::default());
        }
        self.index().retrieve(&term.to_lowercase(), wildcards)
    }

    /// TF-IDF statistics for `document` against the published index, or
    /// `None` while unloaded.
    pub fn document_stats(&self, document: &DocumentSnapshot) -> Option<Result<DocumentStats>> {
        if !self.is_loaded() {
            return None;
        }
        Some(DocumentStats::new(document, self.index()))
    }

    fn submit(&self, task: Task, background: bool) -> Result<()> {
        let submit_tx = self.submit_tx.as_ref().ok_or(SearchError::WorkerStopped)?;
        if background {
            return submit_tx
                .send(Job { task, reply: None })
                .map_err(|_| SearchError::WorkerStopped);
        }

        let (reply_tx, reply_rx) = channel::bounded(1);
        submit_tx
            .send(Job {
                task,
                reply: Some(reply_tx),
            })
            .map_err(|_| SearchError::WorkerStopped)?;
        reply_rx.recv().map_err(|_| SearchError::WorkerStopped)?
    }
}

impl Drop for IndexManager {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue drains
        self.submit_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Index worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("doc1.tsv"), "hello\tO\nworld\tO\n").unwrap();
        fs::write(dir.path().join("doc2.tsv"), "hello\tO\nnurse\tO\n").unwrap();
        fs::write(dir.path().join("doc3.tsv"), "good\tO\nmorning\tO\n").unwrap();
        let md = dir.path().join(".dragonfly");
        (dir, md)
    }

    #[test]
    fn test_unloaded_manager_returns_empty() {
        let (dir, md) = corpus();
        let manager = IndexManager::new(dir.path(), &md).unwrap();
        assert_eq!(manager.data_dir(), dir.path());
        assert_eq!(manager.metadata_dir(), md.as_path());
        assert_eq!(manager.index_path(), md.join(INVERTED_INDEX_FILENAME));
        assert!(!manager.is_loaded());
        assert!(manager.retrieve("hello", false).unwrap().is_empty());
        assert!(manager
            .document_stats(&DocumentSnapshot::from_words("d", &[&["hello"]]))
            .is_none());
    }

    #[test]
    fn test_sync_build_and_retrieve() {
        let (dir, md) = corpus();
        let manager = IndexManager::new(dir.path(), &md).unwrap();
        manager.build_index(false).unwrap();
        assert!(manager.is_loaded());
        assert!(manager.index_path().exists());
        assert_eq!(manager.num_documents(), 3);

        let results = manager.retrieve("HELLO", false).unwrap();
        assert_eq!(results.count, 2);
        let docs: Vec<&str> = results.refs.iter().map(|r| r.doc.as_str()).collect();
        assert_eq!(docs, vec!["doc1.tsv", "doc2.tsv"]);
    }

    #[test]
    fn test_load_missing_is_not_fatal() {
        let (dir, md) = corpus();
        let manager = IndexManager::new(dir.path(), &md).unwrap();
        manager.load_index(false, false).unwrap();
        assert!(!manager.is_loaded());
    }

    #[test]
    fn test_load_builds_if_missing() {
        let (dir, md) = corpus();
        let manager = IndexManager::new(dir.path(), &md).unwrap();
        manager.load_index(true, true).unwrap();
        manager.wait_idle().unwrap();
        assert!(manager.is_loaded());
        assert_eq!(manager.retrieve("morning", false).unwrap().count, 1);
    }

    #[test]
    fn test_background_build_then_reload_in_new_manager() {
        let (dir, md) = corpus();
        {
            let manager = IndexManager::new(dir.path(), &md).unwrap();
            manager.build_index(true).unwrap();
        }
        let manager = IndexManager::new(dir.path(), &md).unwrap();
        manager.load_index(false, false).unwrap();
        assert!(manager.is_loaded());
        assert_eq!(manager.retrieve("hello", false).unwrap().count, 2);
    }

    #[test]
    fn test_failed_build_keeps_previous_index() {
        let (dir, md) = corpus();
        let manager = IndexManager::new(dir.path(), &md).unwrap();
        manager.build_index(false).unwrap();

        fs::write(dir.path().join("doc4.tsv"), "TOKEN\tROMAN\nbroken\n").unwrap();
        let err = manager.build_index(false).unwrap_err();
        assert!(matches!(err, SearchError::Tsv { .. }));
        assert!(manager.is_loaded());
        assert_eq!(manager.num_documents(), 3);
        assert_eq!(manager.retrieve("hello", false).unwrap().count, 2);
    }

    #[test]
    fn test_corrupt_index_file_unloads() {
        let (dir, md) = corpus();
        fs::create_dir_all(&md).unwrap();
        fs::write(md.join(INVERTED_INDEX_FILENAME), b"garbage").unwrap();
        let manager = IndexManager::new(dir.path(), &md).unwrap();
        let err = manager.load_index(false, true).unwrap_err();
        assert!(err.needs_rebuild());
        assert!(!manager.is_loaded());
    }
}
