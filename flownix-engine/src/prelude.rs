//! Prelude for commonly used types and traits in flownix-engine.

pub use crate::analysis::{ColumnClass, QualityLevel};
pub use crate::config::EngineConfig;
pub use crate::error::{EngineError, ErrorContext, Result};
pub use crate::orchestrator::AnalysisOrchestrator;
pub use crate::registry::{DatasetId, DatasetRegistry, DatasetStore, InMemoryDatasetStore};
pub use crate::report::AnalysisReport;
pub use crate::sources::{ingest_bytes, ingest_path, IngestConfig, IngestedTable};
pub use crate::table::{CellValue, Column, ContainerFormat, SourceMetadata, StorageKind, Table};
