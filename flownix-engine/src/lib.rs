//! # Flownix Engine - Dataset Profiling and Quality Scoring
//!
//! Flownix Engine turns an uploaded tabular dataset into a structured profile:
//! semantic column types, missingness, duplication, memory footprint,
//! descriptive statistics, strongly correlated numeric pairs and a composite
//! quality score. It is the analysis core behind the Flownix ML pipeline
//! builder's dataset endpoints.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flownix_engine::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let orchestrator = AnalysisOrchestrator::in_memory();
//!
//! // Parse an upload and register it
//! let id = orchestrator
//!     .ingest_and_register(b"id,score\n1,0.5\n2,0.7\n", "scores.csv", &IngestConfig::default())
//!     .await?;
//!
//! // Analyze it
//! let report = orchestrator.analyze(&id).await?;
//! println!("quality: {}", report.data_quality.quality_level);
//! println!("{}", report.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```
//!
//! Tables can also be built in memory and analyzed without a registry:
//!
//! ```rust
//! use flownix_engine::orchestrator::build_report;
//! use flownix_engine::registry::DatasetId;
//! use flownix_engine::table::{Column, ContainerFormat, SourceMetadata, Table};
//!
//! let table = Table::try_new(vec![
//!     Column::integers("x", [1, 2, 3, 4, 5].map(Some)),
//!     Column::integers("y", [2, 4, 6, 8, 10].map(Some)),
//! ])
//! .unwrap();
//! let metadata = SourceMetadata::new("xy.csv", ContainerFormat::Csv, 0);
//!
//! let report = build_report(DatasetId::new_random(), &table, &metadata).unwrap();
//! assert_eq!(report.correlations.len(), 1);
//! ```
//!
//! ## Layout
//!
//! - [`table`]: the immutable columnar model every component reads
//! - [`sources`]: CSV, JSON, Parquet and Excel ingestion
//! - [`registry`]: dataset identifiers and pluggable storage
//! - [`analysis`]: the profiling components
//! - [`orchestrator`]: runs the pipeline and assembles the [`report`]
//!
//! ## Logging
//!
//! The crate emits `tracing` events and spans but never installs a
//! subscriber. Applications can use [`logging::setup::init_logging`].

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod prelude;
pub mod registry;
pub mod report;
pub mod sources;
pub mod table;
