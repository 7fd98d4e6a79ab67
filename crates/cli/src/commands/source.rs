//! Where a snapshot comes from.

use std::fmt;
use std::path::PathBuf;

use sabore_core::Snapshot;

use crate::client::{BackendClient, OrderQuery};
use crate::config::CliConfig;
use crate::error::CliError;

/// Origin of the orders to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSource {
    /// A JSON file in the backend's payload format.
    File(PathBuf),
    /// The backend order endpoint, filtered by `query`.
    Backend(OrderQuery),
}

impl fmt::Display for OrderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Backend(_) => write!(f, "backend"),
        }
    }
}

/// Load one snapshot from `source`.
///
/// # Errors
///
/// Returns `CliError::ReadFile` or `CliError::Snapshot` for file sources and
/// `CliError::Client` for backend sources.
pub async fn load_snapshot(source: &OrderSource, config: &CliConfig) -> Result<Snapshot, CliError> {
    let snapshot = match source {
        OrderSource::File(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|source| CliError::ReadFile {
                path: path.clone(),
                source,
            })?;
            Snapshot::from_slice(&bytes).map_err(|source| CliError::Snapshot {
                path: path.clone(),
                source,
            })?
        }
        OrderSource::Backend(query) => {
            let client = BackendClient::new(
                config.api_base_url.clone(),
                config.http_timeout,
                config.retry_attempts,
            )?;
            client.fetch_orders(query).await?
        }
    };

    if snapshot.skipped > 0 {
        tracing::warn!(
            skipped = snapshot.skipped,
            %source,
            "Skipped payload elements that are not orders"
        );
    }
    Ok(snapshot)
}
