//! Parameters for a full analytics run.

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::metrics::DEFAULT_WINDOW_DAYS;
use crate::ranking::DEFAULT_TOP_N;
use crate::trend::{DEFAULT_FORECAST_DAYS, DEFAULT_TREND_DAYS};

/// Explicit configuration for [`build_report`](crate::build_report).
///
/// The engine never reads configuration from the environment; callers load
/// it however they like and pass it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Length of each growth comparison window, in days.
    pub window_days: i64,
    /// Number of items kept in the top-item ranking.
    pub top_n: usize,
    /// How far back the trend analysis looks, in days.
    pub trend_days: i64,
    /// Number of days to forecast.
    pub forecast_days: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            top_n: DEFAULT_TOP_N,
            trend_days: DEFAULT_TREND_DAYS,
            forecast_days: DEFAULT_FORECAST_DAYS,
        }
    }
}

impl AnalyticsConfig {
    /// Check every parameter.
    ///
    /// Window bounds relative to a reference time are checked again by the
    /// operations that use them.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found.
    pub const fn validate(&self) -> Result<(), AnalyticsError> {
        if self.window_days <= 0 {
            return Err(AnalyticsError::InvalidWindow(self.window_days));
        }
        if self.trend_days <= 0 {
            return Err(AnalyticsError::InvalidWindow(self.trend_days));
        }
        if self.top_n == 0 {
            return Err(AnalyticsError::InvalidTopN);
        }
        if self.forecast_days == 0 {
            return Err(AnalyticsError::InvalidForecastHorizon);
        }
        Ok(())
    }
}
