// # Memory Checkpoint Store
//
// In-memory implementation of CheckpointStore.
//
// ## Purpose
//
// Keeps the checkpoint for the lifetime of the process only. Useful for
// tests, dry runs, and embedding the scanner where persistence is handled
// elsewhere.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::checkpoint_store::{Checkpoint, CheckpointStore};

/// In-memory checkpoint store
///
/// Clones share the same underlying checkpoint.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    inner: Arc<RwLock<Checkpoint>>,
    saves: Arc<std::sync::atomic::AtomicUsize>,
}

impl MemoryCheckpointStore {
    /// Create an empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a checkpoint
    pub fn with_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            inner: Arc::new(RwLock::new(checkpoint)),
            saves: Arc::default(),
        }
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Current checkpoint
    pub async fn snapshot(&self) -> Checkpoint {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self) -> Result<Checkpoint, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), Error> {
        *self.inner.write().await = checkpoint.clone();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
