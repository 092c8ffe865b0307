//! Error types for the Flownix profiling engine.
//!
//! All fallible operations in the crate return [`EngineError`]. The first three
//! variants are the kinds the analysis contract promises to the transport layer;
//! the rest are produced at the ingestion and configuration boundaries.

use thiserror::Error;

/// The main error type for the profiling engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Analysis was requested for an identifier the registry does not know.
    #[error("Dataset '{id}' not found")]
    NotFound {
        /// The identifier as supplied by the caller
        id: String,
    },

    /// A table has no columns (or no rows where a computation needs them).
    #[error("Empty table: {0}")]
    EmptyTable(String),

    /// A column's declared storage kind has no place in the classifier's mapping.
    #[error("Unsupported storage kind '{kind}' for column '{column}'")]
    UnsupportedStorageKind {
        /// Column carrying the unsupported kind
        column: String,
        /// Source-level type name (e.g. the Arrow data type)
        kind: String,
    },

    /// The uploaded file's container format is not recognised.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The uploaded payload exceeds the configured size limit.
    #[error("Upload of {size} bytes exceeds the limit of {limit} bytes")]
    UploadTooLarge {
        /// Payload size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// A table violates the column model (ragged columns, duplicate names, mistyped cells).
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV", "Parquet", "Excel")
        source_type: String,
        /// Detailed error message
        message: String,
    },

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Creates a not-found error for the given identifier.
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Creates an empty-table error.
    pub fn empty_table(message: impl Into<String>) -> Self {
        Self::EmptyTable(message.into())
    }

    /// Creates an unsupported-storage-kind error.
    pub fn unsupported_kind(column: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedStorageKind {
            column: column.into(),
            kind: kind.into(),
        }
    }

    /// Creates an invalid-table error.
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidTable(message.into())
    }

    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Returns true for the error kinds that mean "the caller asked for something
    /// that does not exist", as opposed to a failure while computing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<EngineError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            EngineError::Internal(inner) => EngineError::Internal(format!("{msg}: {inner}")),
            other => EngineError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                EngineError::Internal(inner) => EngineError::Internal(format!("{msg}: {inner}")),
                other => EngineError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
