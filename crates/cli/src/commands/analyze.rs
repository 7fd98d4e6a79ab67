//! Running an analysis over a loaded snapshot.

use chrono::{DateTime, Utc};
use sabore_analytics::{
    AnalyticsConfig, AnalyticsError, Granularity, aggregate_by_period, build_report,
    compute_metrics, rank_items,
};
use sabore_core::Snapshot;
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

/// One analysis selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    /// Every analysis, using the configured parameters.
    Report,
    Metrics { window_days: i64 },
    TopItems { limit: usize },
    Series { granularity: Granularity },
}

impl Analysis {
    /// Stable name used in the output envelope.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Metrics { .. } => "metrics",
            Self::TopItems { .. } => "top_items",
            Self::Series { .. } => "series",
        }
    }

    /// Check the parameters this analysis will use.
    ///
    /// `config` supplies everything a report needs; single analyses carry
    /// their own parameter and ignore the rest of `config`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter.
    pub fn validate(&self, config: &AnalyticsConfig) -> Result<(), AnalyticsError> {
        let defaults = AnalyticsConfig::default();
        match *self {
            Self::Report => config.validate(),
            Self::Metrics { window_days } => AnalyticsConfig {
                window_days,
                ..defaults
            }
            .validate(),
            Self::TopItems { limit } => AnalyticsConfig {
                top_n: limit,
                ..defaults
            }
            .validate(),
            Self::Series { .. } => Ok(()),
        }
    }

    /// Run the analysis over `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Analytics` if a parameter is rejected by the
    /// engine.
    pub fn run(
        &self,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
        config: &AnalyticsConfig,
    ) -> Result<AnalysisOutput, CliError> {
        let orders = snapshot.orders.as_slice();
        let result = match *self {
            Self::Report => serde_json::to_value(build_report(orders, now, config)?)?,
            Self::Metrics { window_days } => {
                serde_json::to_value(compute_metrics(orders, now, window_days)?)?
            }
            Self::TopItems { limit } => serde_json::to_value(rank_items(orders, limit)?)?,
            Self::Series { granularity } => {
                serde_json::to_value(aggregate_by_period(orders, granularity))?
            }
        };

        Ok(AnalysisOutput {
            analysis: self.name(),
            generated_at: now,
            orders: orders.len(),
            skipped: snapshot.skipped,
            result,
        })
    }
}

/// JSON document written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutput {
    pub analysis: &'static str,
    pub generated_at: DateTime<Utc>,
    /// Orders decoded from the payload.
    pub orders: usize,
    /// Payload elements that could not be decoded as orders.
    pub skipped: usize,
    pub result: Value,
}
