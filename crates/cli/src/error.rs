//! Top-level CLI errors.

use std::path::PathBuf;

use sabore_analytics::AnalyticsError;
use sabore_core::SnapshotError;
use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;

/// Anything that can end a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Client(#[from] ClientError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid order snapshot in {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        source: SnapshotError,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}
