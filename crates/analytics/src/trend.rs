//! Daily sales trend and a moving-average forecast.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sabore_core::OrderRecord;
use serde::Serialize;

use crate::error::{AnalyticsError, window_length};
use crate::money;
use crate::period::{Granularity, aggregate_by_period};

/// How far back the trend looks when the caller has no preference.
pub const DEFAULT_TREND_DAYS: i64 = 30;

/// Days forecast when the caller has no preference.
pub const DEFAULT_FORECAST_DAYS: usize = 7;

/// Daily buckets averaged by the forecast.
pub const FORECAST_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    /// Direction of the least-squares line through `totals`.
    ///
    /// The sign is taken from the exact covariance
    /// `Σ (2i - (n - 1)) · yᵢ`, so any nonzero slope counts. `fallback` is
    /// used only when that sum does not fit in a `Decimal`.
    fn of_series(totals: &[Decimal], fallback: f64) -> Self {
        let last = Decimal::from(totals.len().saturating_sub(1));
        let covariance = totals
            .iter()
            .enumerate()
            .try_fold(Decimal::ZERO, |sum, (i, total)| {
                let weight = Decimal::from(i).checked_mul(Decimal::TWO)?.checked_sub(last)?;
                sum.checked_add(weight.checked_mul(*total)?)
            });

        let sign = covariance.map_or_else(
            || fallback.partial_cmp(&0.0).unwrap_or(Ordering::Equal),
            |covariance| covariance.cmp(&Decimal::ZERO),
        );
        match sign {
            Ordering::Greater => Self::Rising,
            Ordering::Less => Self::Falling,
            Ordering::Equal => Self::Stable,
        }
    }
}

/// Direction of daily sales over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTrend {
    pub direction: TrendDirection,
    /// Least-squares change in daily total per day with sales.
    pub daily_slope: f64,
    /// Days with at least one order inside the window.
    pub days_observed: usize,
    pub excluded: usize,
}

/// Flat projection of recent daily sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesForecast {
    /// Mean of the most recent daily totals, 2 decimal places.
    pub daily_average: Decimal,
    /// One value per forecast day.
    pub values: Vec<Decimal>,
    /// Number of daily buckets the average was taken over.
    pub based_on_days: usize,
}

/// Fit a line through the daily totals of the last `days` days.
///
/// Days without orders are not buckets, so the slope is measured per
/// observed day rather than per calendar day.
///
/// # Errors
///
/// Returns `AnalyticsError::InvalidWindow` if `days` is not positive or the
/// window cannot be subtracted from `now`.
pub fn analyze_trend(
    orders: &[OrderRecord],
    now: DateTime<Utc>,
    days: i64,
) -> Result<SalesTrend, AnalyticsError> {
    let since = now - window_length(days, now, 1)?;

    let mut excluded = 0;
    let recent = orders.iter().filter(|order| match order.placed_at.as_ref() {
        Some(placed) => placed.instant() >= since,
        None => {
            excluded += 1;
            false
        }
    });
    let series = aggregate_by_period(recent, Granularity::Day);

    let totals: Vec<Decimal> = series.totals().collect();
    let approximate: Vec<f64> = totals
        .iter()
        .map(|total| total.to_f64().unwrap_or(0.0))
        .collect();
    let daily_slope = least_squares_slope(&approximate);

    tracing::debug!(
        days_observed = totals.len(),
        daily_slope,
        "Computed sales trend"
    );

    Ok(SalesTrend {
        direction: TrendDirection::of_series(&totals, daily_slope),
        daily_slope,
        days_observed: totals.len(),
        excluded: excluded + series.excluded,
    })
}

/// Forecast the next `horizon` days as the mean of the latest daily totals.
///
/// # Errors
///
/// Returns `AnalyticsError::InvalidForecastHorizon` if `horizon` is zero.
pub fn forecast_sales(
    orders: &[OrderRecord],
    horizon: usize,
) -> Result<SalesForecast, AnalyticsError> {
    if horizon == 0 {
        return Err(AnalyticsError::InvalidForecastHorizon);
    }

    let series = aggregate_by_period(orders, Granularity::Day);
    let skip = series.buckets.len().saturating_sub(FORECAST_WINDOW);
    let recent: Vec<Decimal> = series.totals().skip(skip).collect();

    let daily_average = money::mean(&recent).round_dp(2);

    Ok(SalesForecast {
        daily_average,
        values: vec![daily_average; horizon],
        based_on_days: recent.len(),
    })
}

/// Slope of `values` against their positions `0, 1, 2, ...`.
#[allow(clippy::cast_precision_loss)]
fn least_squares_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let (covariance, variance) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(cov, var), (i, y)| {
            let dx = i as f64 - mean_x;
            (dx.mul_add(y - mean_y, cov), dx.mul_add(dx, var))
        });

    // positions are distinct, so variance is positive for two or more values
    covariance / variance
}
