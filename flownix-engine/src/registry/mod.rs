//! Dataset registry: identifier assignment and storage of registered tables.
//!
//! Storage is pluggable through the [`DatasetStore`] trait so the registry can
//! be injected into the orchestrator (and replaced in tests) instead of living
//! in a process global. [`InMemoryDatasetStore`] keeps datasets for the life
//! of the process.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::table::{SourceMetadata, Table};

pub mod in_memory;

pub use in_memory::InMemoryDatasetStore;

/// Fresh identifiers tried before registration gives up.
const MAX_ID_ATTEMPTS: usize = 4;

/// Opaque dataset handle backed by a random (v4) UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(Uuid);

impl DatasetId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A string that is not a UUID cannot name a registered dataset, so parse
/// failures surface as [`EngineError::NotFound`].
impl FromStr for DatasetId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| EngineError::not_found(s))
    }
}

impl From<Uuid> for DatasetId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A registered table with its source metadata.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: DatasetId,
    pub table: Arc<Table>,
    pub metadata: SourceMetadata,
    pub registered_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(id: DatasetId, table: Arc<Table>, metadata: SourceMetadata) -> Self {
        Self {
            id,
            table,
            metadata,
            registered_at: Utc::now(),
        }
    }
}

/// Storage backend for registered datasets.
///
/// Implementations must be safe to share between tasks. `put` must never
/// overwrite: when the identifier is already present it returns `Ok(false)`
/// and leaves the existing dataset untouched.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Inserts a dataset unless its identifier is taken.
    async fn put(&self, dataset: Arc<Dataset>) -> Result<bool>;

    async fn get(&self, id: &DatasetId) -> Result<Option<Arc<Dataset>>>;

    /// Removes a dataset, returning it if it was present.
    async fn delete(&self, id: &DatasetId) -> Result<Option<Arc<Dataset>>>;

    /// Identifiers of every stored dataset, in no particular order.
    async fn list_ids(&self) -> Result<Vec<DatasetId>>;

    async fn exists(&self, id: &DatasetId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

/// Assigns identifiers and stores datasets through a [`DatasetStore`].
#[derive(Clone)]
pub struct DatasetRegistry {
    store: Arc<dyn DatasetStore>,
}

impl DatasetRegistry {
    pub fn new(store: Arc<dyn DatasetStore>) -> Self {
        Self { store }
    }

    /// A registry backed by a fresh [`InMemoryDatasetStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDatasetStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn DatasetStore> {
        &self.store
    }

    /// Registers a table and returns its new identifier.
    ///
    /// Tables without columns are rejected with [`EngineError::EmptyTable`];
    /// tables with columns but no rows are accepted.
    #[instrument(skip(self, table, metadata), fields(
        filename = %metadata.filename,
        rows = table.row_count(),
        columns = table.column_count()
    ))]
    pub async fn register(&self, table: Table, metadata: SourceMetadata) -> Result<DatasetId> {
        if table.column_count() == 0 {
            return Err(EngineError::empty_table(format!(
                "'{}' has no columns",
                metadata.filename
            )));
        }

        let table = Arc::new(table);
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = DatasetId::new_random();
            let dataset = Arc::new(Dataset::new(id, Arc::clone(&table), metadata.clone()));
            if self.store.put(dataset).await? {
                info!(dataset_id = %id, "Registered dataset");
                return Ok(id);
            }
            warn!(dataset_id = %id, "Dataset id collision, retrying with a fresh id");
        }

        Err(EngineError::Internal(format!(
            "could not allocate a unique dataset id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    /// Looks up a dataset, failing with [`EngineError::NotFound`] if unknown.
    pub async fn get(&self, id: &DatasetId) -> Result<Arc<Dataset>> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| EngineError::not_found(id))
    }

    /// Resolves a caller-supplied identifier string.
    pub async fn get_by_str(&self, id: &str) -> Result<Arc<Dataset>> {
        let id: DatasetId = id.parse()?;
        self.get(&id).await
    }

    pub async fn contains(&self, id: &DatasetId) -> Result<bool> {
        self.store.exists(id).await
    }

    /// Removes a dataset, failing with [`EngineError::NotFound`] if unknown.
    #[instrument(skip(self), fields(dataset_id = %id))]
    pub async fn remove(&self, id: &DatasetId) -> Result<Arc<Dataset>> {
        let removed = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| EngineError::not_found(id))?;
        info!("Removed dataset");
        Ok(removed)
    }

    /// All registered datasets, oldest first.
    pub async fn list(&self) -> Result<Vec<Arc<Dataset>>> {
        let mut datasets = Vec::new();
        for id in self.store.list_ids().await? {
            // A concurrent removal between listing and lookup just skips the id
            if let Some(dataset) = self.store.get(&id).await? {
                datasets.push(dataset);
            }
        }
        datasets.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(datasets)
    }
}

impl fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ContainerFormat};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_table() -> Table {
        Table::try_new(vec![Column::integers("id", [Some(1), Some(2)])]).unwrap()
    }

    fn metadata() -> SourceMetadata {
        SourceMetadata::new("sample.csv", ContainerFormat::Csv, 12)
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = DatasetRegistry::in_memory();
        let id = registry.register(sample_table(), metadata()).await.unwrap();

        let dataset = registry.get(&id).await.unwrap();
        assert_eq!(dataset.id, id);
        assert_eq!(dataset.table.row_count(), 2);
        assert_eq!(dataset.metadata.filename, "sample.csv");
        assert!(registry.contains(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let registry = DatasetRegistry::in_memory();
        let a = registry.register(sample_table(), metadata()).await.unwrap();
        let b = registry.register(sample_table(), metadata()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registry = DatasetRegistry::in_memory();
        let err = registry.get(&DatasetId::new_random()).await.unwrap_err();
        assert!(err.is_not_found());

        let err = registry.get_by_str("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { ref id } if id == "not-a-uuid"));
    }

    #[tokio::test]
    async fn test_zero_column_table_is_rejected() {
        let registry = DatasetRegistry::in_memory();
        let err = registry
            .register(Table::try_new(vec![]).unwrap(), metadata())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyTable(_)));
    }

    #[tokio::test]
    async fn test_zero_row_table_is_accepted() {
        let registry = DatasetRegistry::in_memory();
        let table = Table::try_new(vec![Column::integers("a", Vec::new())]).unwrap();
        assert!(registry.register(table, metadata()).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = DatasetRegistry::in_memory();
        let id = registry.register(sample_table(), metadata()).await.unwrap();

        let removed = registry.remove(&id).await.unwrap();
        assert_eq!(removed.id, id);
        assert!(registry.get(&id).await.unwrap_err().is_not_found());
        assert!(registry.remove(&id).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_id_round_trips_through_display() {
        let id = DatasetId::new_random();
        let parsed: DatasetId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    /// Reports a collision for the first `collisions` inserts.
    struct CollidingStore {
        inner: InMemoryDatasetStore,
        collisions: AtomicUsize,
    }

    #[async_trait]
    impl DatasetStore for CollidingStore {
        async fn put(&self, dataset: Arc<Dataset>) -> Result<bool> {
            let remaining = self.collisions.load(Ordering::SeqCst);
            if remaining > 0 {
                self.collisions.store(remaining - 1, Ordering::SeqCst);
                return Ok(false);
            }
            self.inner.put(dataset).await
        }

        async fn get(&self, id: &DatasetId) -> Result<Option<Arc<Dataset>>> {
            self.inner.get(id).await
        }

        async fn delete(&self, id: &DatasetId) -> Result<Option<Arc<Dataset>>> {
            self.inner.delete(id).await
        }

        async fn list_ids(&self) -> Result<Vec<DatasetId>> {
            self.inner.list_ids().await
        }
    }

    #[tokio::test]
    async fn test_collision_is_retried() {
        let registry = DatasetRegistry::new(Arc::new(CollidingStore {
            inner: InMemoryDatasetStore::new(),
            collisions: AtomicUsize::new(2),
        }));
        let id = registry.register(sample_table(), metadata()).await.unwrap();
        assert!(registry.get(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_persistent_collision_fails() {
        let registry = DatasetRegistry::new(Arc::new(CollidingStore {
            inner: InMemoryDatasetStore::new(),
            collisions: AtomicUsize::new(MAX_ID_ATTEMPTS),
        }));
        let err = registry
            .register(sample_table(), metadata())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }
}
