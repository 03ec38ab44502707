//! Corpus loading and immutable, versioned snapshots
//!
//! A snapshot bundles the records, their vocabulary and every derived index.
//! Snapshots are never mutated; a reload builds a new one and swaps the
//! published pointer, so requests in flight keep the snapshot they started on.

mod loader;
mod record;
mod snapshot;
mod store;
mod vocabulary;

pub use loader::{CorpusSource, LoadedCorpus};
pub use record::Record;
pub use snapshot::{Snapshot, SnapshotStats};
pub use store::{SnapshotBuilder, SnapshotStore};
pub use vocabulary::Vocabulary;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{0}' in corpus header")]
    MissingColumn(String),
}
