//! Engine configuration.
//!
//! Defaults suit local use. Deployments override them through environment
//! variables read by [`EngineConfig::from_env`]:
//!
//! | variable                  | field                      |
//! |---------------------------|----------------------------|
//! | `FLOWNIX_MAX_UPLOAD_SIZE` | `ingest.max_upload_size`   |
//! | `FLOWNIX_TEMP_DIR`        | `ingest.temp_dir`          |
//! | `FLOWNIX_LOG_JSON`        | `logging.json_format`      |
//! | `FLOWNIX_LOG_LEVEL`       | `logging.engine_level`     |

use std::path::PathBuf;

use crate::error::{EngineError, Result};
use crate::logging::setup::{parse_level, LoggingConfig};
use crate::sources::IngestConfig;

pub const ENV_MAX_UPLOAD_SIZE: &str = "FLOWNIX_MAX_UPLOAD_SIZE";
pub const ENV_TEMP_DIR: &str = "FLOWNIX_TEMP_DIR";
pub const ENV_LOG_JSON: &str = "FLOWNIX_LOG_JSON";
pub const ENV_LOG_LEVEL: &str = "FLOWNIX_LOG_LEVEL";

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn with_ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Defaults overridden by the `FLOWNIX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_MAX_UPLOAD_SIZE) {
            config.ingest.max_upload_size = value.trim().parse().map_err(|_| {
                EngineError::Configuration(format!(
                    "{ENV_MAX_UPLOAD_SIZE} must be a byte count, got '{value}'"
                ))
            })?;
        }
        if let Some(value) = lookup(ENV_TEMP_DIR) {
            config.ingest.temp_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_LOG_JSON) {
            config.logging.json_format = parse_bool(ENV_LOG_JSON, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.logging.engine_level = parse_level(&value)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EngineError::Configuration(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}
