//! Persistence seam for hits.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::event::Hit;

/// Where finished hits go. Implemented by the embedder's storage layer.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn save_hits(&self, hits: &[Hit]) -> anyhow::Result<()>;

    async fn save_hit(&self, hit: &Hit) -> anyhow::Result<()> {
        self.save_hits(std::slice::from_ref(hit)).await
    }
}

/// Keeps hits in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hits: Mutex<Vec<Hit>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far.
    pub fn hits(&self) -> Vec<Hit> {
        self.hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_hits(&self, hits: &[Hit]) -> anyhow::Result<()> {
        self.hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(hits);
        Ok(())
    }
}
