//! Sequences the profiling pipeline and assembles the report.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::analysis::{classifier, correlation, quality, scoring, statistics};
use crate::error::{EngineError, Result};
use crate::registry::{Dataset, DatasetId, DatasetRegistry, DatasetStore};
use crate::report::{AnalysisReport, BasicInfo, Preview};
use crate::sources::{self, IngestConfig};
use crate::table::{SourceMetadata, Table};

/// Front door of the engine: registers datasets and analyzes them on request.
///
/// Cloning is cheap; clones share the same registry.
///
/// # Example
///
/// ```rust,no_run
/// use flownix_engine::orchestrator::AnalysisOrchestrator;
/// use flownix_engine::sources::IngestConfig;
///
/// # async fn example() -> flownix_engine::error::Result<()> {
/// let orchestrator = AnalysisOrchestrator::in_memory();
/// let id = orchestrator
///     .ingest_and_register(b"a,b\n1,2\n", "upload.csv", &IngestConfig::default())
///     .await?;
/// let report = orchestrator.analyze(&id).await?;
/// println!("{}", report.to_json_pretty()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    registry: DatasetRegistry,
}

impl AnalysisOrchestrator {
    pub fn new(store: Arc<dyn DatasetStore>) -> Self {
        Self {
            registry: DatasetRegistry::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            registry: DatasetRegistry::in_memory(),
        }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub async fn register(&self, table: Table, metadata: SourceMetadata) -> Result<DatasetId> {
        self.registry.register(table, metadata).await
    }

    /// Parses an upload and registers the resulting table.
    pub async fn ingest_and_register(
        &self,
        bytes: &[u8],
        filename: &str,
        config: &IngestConfig,
    ) -> Result<DatasetId> {
        let ingested = sources::ingest_bytes(bytes, filename, config).await?;
        self.register(ingested.table, ingested.metadata).await
    }

    /// Analyzes a registered dataset.
    ///
    /// Fails with [`EngineError::NotFound`] for unknown identifiers.
    #[instrument(skip(self), fields(dataset_id = %id))]
    pub async fn analyze(&self, id: &DatasetId) -> Result<AnalysisReport> {
        let dataset = self.registry.get(id).await?;
        analyze_dataset(&dataset)
    }

    /// Like [`analyze`](Self::analyze) for a caller-supplied identifier string.
    pub async fn analyze_str(&self, id: &str) -> Result<AnalysisReport> {
        let id: DatasetId = id.parse()?;
        self.analyze(&id).await
    }
}

/// Runs the full pipeline over a registered dataset.
pub fn analyze_dataset(dataset: &Dataset) -> Result<AnalysisReport> {
    build_report(dataset.id, &dataset.table, &dataset.metadata)
}

/// Runs the full pipeline over a table.
///
/// The result depends only on the arguments: the same table, metadata and
/// identifier always produce the same report. Tables without columns fail
/// with [`EngineError::EmptyTable`]; tables with columns but no rows produce
/// a report of zeros.
pub fn build_report(
    dataset_id: DatasetId,
    table: &Table,
    metadata: &SourceMetadata,
) -> Result<AnalysisReport> {
    if table.column_count() == 0 {
        return Err(EngineError::empty_table(format!(
            "dataset {dataset_id} has no columns"
        )));
    }

    let start = Instant::now();

    let classification = classifier::classify(table);
    debug!(columns = classification.len(), "Classified columns");

    let profile = quality::profile(table);
    debug!(
        total_missing = profile.missing.total_missing,
        duplicate_rows = profile.duplicates.duplicate_rows,
        total_bytes = profile.memory.total_bytes,
        "Profiled data quality"
    );

    let statistics = statistics::compute_statistics(table, &classification);
    let correlations = correlation::find_correlations(table, &classification);
    let data_quality = scoring::score(&profile.missing, &profile.duplicates, table);

    let report = AnalysisReport {
        dataset_id,
        basic_info: BasicInfo::new(table, metadata),
        column_types: classification.column_types(),
        missing_values: profile.missing,
        duplicates: profile.duplicates,
        memory_usage: profile.memory,
        statistics,
        correlations,
        data_quality,
        preview: Preview::new(table),
    };

    info!(
        dataset_id = %dataset_id,
        rows = table.row_count(),
        columns = table.column_count(),
        overall_score = report.data_quality.overall_score,
        quality_level = %report.data_quality.quality_level,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Analysis complete"
    );

    Ok(report)
}
