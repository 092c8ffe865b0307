//! Process-lifetime dataset storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{Dataset, DatasetId, DatasetStore};
use crate::error::Result;

/// Stores datasets in a `HashMap` behind a tokio `RwLock`.
///
/// Lookups take the shared lock; inserts and removals take the exclusive one.
/// Nothing is ever evicted, so datasets live until removed or until the
/// process exits.
///
/// # Example
///
/// ```rust,ignore
/// use flownix_engine::registry::{DatasetRegistry, InMemoryDatasetStore};
///
/// let registry = DatasetRegistry::new(Arc::new(InMemoryDatasetStore::new()));
/// let id = registry.register(table, metadata).await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryDatasetStore {
    datasets: Arc<RwLock<HashMap<DatasetId, Arc<Dataset>>>>,
}

impl InMemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.datasets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.datasets.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.datasets.write().await.clear();
    }
}

#[async_trait]
impl DatasetStore for InMemoryDatasetStore {
    #[instrument(skip(self, dataset), fields(dataset_id = %dataset.id, store_type = "in_memory"))]
    async fn put(&self, dataset: Arc<Dataset>) -> Result<bool> {
        let mut datasets = self.datasets.write().await;
        if datasets.contains_key(&dataset.id) {
            return Ok(false);
        }
        datasets.insert(dataset.id, dataset);
        debug!(total = datasets.len(), "Stored dataset");
        Ok(true)
    }

    async fn get(&self, id: &DatasetId) -> Result<Option<Arc<Dataset>>> {
        Ok(self.datasets.read().await.get(id).cloned())
    }

    #[instrument(skip(self), fields(dataset_id = %id, store_type = "in_memory"))]
    async fn delete(&self, id: &DatasetId) -> Result<Option<Arc<Dataset>>> {
        Ok(self.datasets.write().await.remove(id))
    }

    async fn list_ids(&self) -> Result<Vec<DatasetId>> {
        Ok(self.datasets.read().await.keys().copied().collect())
    }

    async fn exists(&self, id: &DatasetId) -> Result<bool> {
        Ok(self.datasets.read().await.contains_key(id))
    }
}
