use super::{CorpusSource, Snapshot};
use crate::embedding::WordEmbedder;
use crate::error::{Result, TagsearchError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Builds snapshots from the configured corpus source
#[derive(Clone)]
pub struct SnapshotBuilder {
    source: CorpusSource,
    embedder: Option<Arc<dyn WordEmbedder>>,
}

impl SnapshotBuilder {
    pub fn new(source: CorpusSource, embedder: Option<Arc<dyn WordEmbedder>>) -> Self {
        Self { source, embedder }
    }

    pub fn source(&self) -> &CorpusSource {
        &self.source
    }

    /// Load the corpus and build every derived index.
    ///
    /// Returns `DataUnavailable` when the corpus cannot be read.
    pub fn build(&self, version: u64) -> Result<Snapshot> {
        let corpus = self
            .source
            .load()
            .map_err(|source| TagsearchError::DataUnavailable {
                path: self.source.path.clone(),
                source,
            })?;
        Ok(Snapshot::build(version, corpus, self.embedder.as_deref()))
    }
}

/// Holder of the published snapshot.
///
/// Readers clone the `Arc` and release the lock immediately; a reload
/// builds the replacement outside the lock and swaps it in one write.
pub struct SnapshotStore {
    builder: SnapshotBuilder,
    current: RwLock<Arc<Snapshot>>,
    next_version: AtomicU64,
    reload_lock: Mutex<()>,
}

impl SnapshotStore {
    /// Load the first snapshot; fails if the corpus is unavailable
    pub fn open(builder: SnapshotBuilder) -> Result<Self> {
        let snapshot = builder.build(1)?;
        Ok(Self::with_snapshot(builder, snapshot))
    }

    /// Publish an already-built snapshot
    pub fn with_snapshot(builder: SnapshotBuilder, snapshot: Snapshot) -> Self {
        let next_version = snapshot.version() + 1;
        Self {
            builder,
            current: RwLock::new(Arc::new(snapshot)),
            next_version: AtomicU64::new(next_version),
            reload_lock: Mutex::new(()),
        }
    }

    /// The snapshot new requests should run against
    pub fn current(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build a fresh snapshot and publish it.
    ///
    /// On failure the previous snapshot stays published.
    pub fn reload(&self) -> Result<Arc<Snapshot>> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let snapshot = match self.builder.build(version) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                tracing::warn!("Reload failed, keeping snapshot {}: {}", self.current().version(), e);
                return Err(e);
            }
        };

        let previous = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, snapshot.clone())
        };

        if previous.fingerprint() == snapshot.fingerprint() {
            tracing::info!(
                "Snapshot {} activated (corpus unchanged since {})",
                snapshot.version(),
                previous.version()
            );
        } else {
            tracing::info!(
                "Snapshot {} activated, replacing {}",
                snapshot.version(),
                previous.version()
            );
        }

        Ok(snapshot)
    }
}
