//! Errors raised by the analytics engine.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// Rejected configuration parameters.
///
/// Malformed records are never errors; only parameters that would make a
/// result meaningless are.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// A time window was zero, negative, or too large to represent.
    #[error("window must be a positive, representable number of days (got {0})")]
    InvalidWindow(i64),

    /// A ranking was asked for zero items.
    #[error("top-N limit must be at least 1")]
    InvalidTopN,

    /// A forecast was asked for zero days.
    #[error("forecast horizon must be at least 1 day")]
    InvalidForecastHorizon,
}

/// Resolve `days` into a window length, checking that `multiples` windows
/// can be subtracted from `now`.
pub(crate) fn window_length(
    days: i64,
    now: DateTime<Utc>,
    multiples: i32,
) -> Result<TimeDelta, AnalyticsError> {
    if days <= 0 {
        return Err(AnalyticsError::InvalidWindow(days));
    }
    let window = TimeDelta::try_days(days).ok_or(AnalyticsError::InvalidWindow(days))?;
    let span = window
        .checked_mul(multiples)
        .ok_or(AnalyticsError::InvalidWindow(days))?;
    now.checked_sub_signed(span)
        .ok_or(AnalyticsError::InvalidWindow(days))?;
    Ok(window)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_window_rejects_non_positive() {
        let now = Utc::now();
        assert_eq!(window_length(0, now, 1), Err(AnalyticsError::InvalidWindow(0)));
        assert_eq!(window_length(-7, now, 2), Err(AnalyticsError::InvalidWindow(-7)));
    }

    #[test]
    fn test_window_rejects_unrepresentable() {
        let now = Utc::now();
        assert!(window_length(i64::MAX, now, 2).is_err());
        assert!(window_length(200_000_000, now, 2).is_err());
    }

    #[test]
    fn test_window_accepts_positive() {
        let window = window_length(30, Utc::now(), 2).unwrap();
        assert_eq!(window.num_days(), 30);
    }
}
