//! Integration tests for dataset registration and lookup.

use std::collections::HashSet;
use std::sync::Arc;

use flownix_engine::error::EngineError;
use flownix_engine::orchestrator::AnalysisOrchestrator;
use flownix_engine::registry::{DatasetId, DatasetRegistry, DatasetStore, InMemoryDatasetStore};
use flownix_engine::table::{Column, ContainerFormat, SourceMetadata, Table};

fn table(rows: i64) -> Table {
    Table::try_new(vec![Column::integers("n", (0..rows).map(Some))]).unwrap()
}

fn metadata() -> SourceMetadata {
    SourceMetadata::new("numbers.csv", ContainerFormat::Csv, 100)
}

#[tokio::test]
async fn test_shared_store_between_orchestrators() {
    let store: Arc<dyn DatasetStore> = Arc::new(InMemoryDatasetStore::new());
    let writer = AnalysisOrchestrator::new(Arc::clone(&store));
    let reader = AnalysisOrchestrator::new(store);

    let id = writer.register(table(3), metadata()).await.unwrap();
    let report = reader.analyze(&id).await.unwrap();
    assert_eq!(report.basic_info.rows, 3);
}

#[tokio::test]
async fn test_concurrent_registrations_get_distinct_ids() {
    let registry = DatasetRegistry::in_memory();

    let mut handles = Vec::new();
    for rows in 0..32 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry.register(table(rows), metadata()).await.unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }
    assert_eq!(ids.len(), 32);
    assert_eq!(registry.list().await.unwrap().len(), 32);
}

#[tokio::test]
async fn test_registered_table_is_shared_not_copied() {
    let registry = DatasetRegistry::in_memory();
    let id = registry.register(table(5), metadata()).await.unwrap();

    let first = registry.get(&id).await.unwrap();
    let second = registry.get(&id).await.unwrap();
    assert!(Arc::ptr_eq(&first.table, &second.table));
}

#[tokio::test]
async fn test_lookup_by_string() {
    let registry = DatasetRegistry::in_memory();
    let id = registry.register(table(1), metadata()).await.unwrap();

    let dataset = registry.get_by_str(&id.to_string()).await.unwrap();
    assert_eq!(dataset.id, id);

    let unknown = DatasetId::new_random().to_string();
    let err = registry.get_by_str(&unknown).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
    assert_eq!(err.to_string(), format!("Dataset '{unknown}' not found"));
}

#[tokio::test]
async fn test_list_is_ordered_by_registration() {
    let registry = DatasetRegistry::in_memory();
    let mut expected = Vec::new();
    for rows in 0..4 {
        expected.push(registry.register(table(rows), metadata()).await.unwrap());
    }

    let listed = registry.list().await.unwrap();
    let timestamps: Vec<_> = listed.iter().map(|d| d.registered_at).collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));

    let listed_ids: HashSet<DatasetId> = listed.iter().map(|d| d.id).collect();
    assert_eq!(listed_ids, expected.into_iter().collect::<HashSet<_>>());
}
