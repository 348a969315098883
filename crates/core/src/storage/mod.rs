//! Storage layer: index snapshot persistence.
//!
//! The whole index lives in memory; durability is a single bincode snapshot
//! per corpus (atomic temp-file + rename, CRC32 footer).

/// Disk persistence: snapshot save/load with atomic writes.
pub mod persistence;

pub use persistence::{load_index, save_index, IndexSnapshot, TermRecord};
