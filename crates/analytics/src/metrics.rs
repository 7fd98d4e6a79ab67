//! Headline sales metrics and period-over-period growth.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sabore_core::OrderRecord;
use serde::Serialize;

use crate::error::{AnalyticsError, window_length};
use crate::money::{self, Sum};

/// Growth window length when the caller has no preference.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Growth reported when the previous window had no sales but the current
/// one did.
const GROWTH_FROM_ZERO: Decimal = Decimal::ONE_HUNDRED;

/// Headline numbers for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Sum of every order's value, dated or not.
    pub total_revenue: Decimal,
    pub order_count: usize,
    /// `total_revenue` over the orders it includes, zero when there are none.
    pub average_order_value: Decimal,
    /// Orders whose value could not be represented, left out of revenue and
    /// the average.
    pub excluded: usize,
    /// Percentage change between the two growth windows, 2 decimal places.
    pub growth_percent: Decimal,
    pub growth: GrowthComparison,
}

/// Revenue in the trailing window against the window before it.
///
/// The current window is `[now - window, now)` and the previous window is
/// `[now - 2 * window, now - window)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrowthComparison {
    pub window_days: i64,
    pub current_total: Decimal,
    pub previous_total: Decimal,
    pub current_orders: usize,
    pub previous_orders: usize,
    pub growth_percent: Decimal,
    /// Orders left out for lack of a parseable timestamp or a representable
    /// value.
    pub excluded: usize,
}

/// Sum of every order value that can be represented.
#[must_use]
pub fn total_revenue(orders: &[OrderRecord]) -> Decimal {
    revenue(orders).total
}

fn revenue(orders: &[OrderRecord]) -> Sum {
    orders.iter().fold(Sum::default(), |mut sum, order| {
        sum.push(order.total());
        sum
    })
}

/// Percentage change from `previous` to `current`, rounded to 2 places.
///
/// A zero `previous` has no ratio; it yields 100 when `current` is positive
/// and 0 otherwise. A ratio too large for a `Decimal` saturates at
/// `Decimal::MAX` or `Decimal::MIN`.
#[must_use]
pub fn growth_percent(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            GROWTH_FROM_ZERO
        } else {
            Decimal::ZERO
        };
    }
    let ratio = current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

    match ratio {
        Some(ratio) => ratio.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        None if (current > previous) == (previous > Decimal::ZERO) => Decimal::MAX,
        None => Decimal::MIN,
    }
}

/// Compare revenue in the trailing `window_days` against the window before.
///
/// # Errors
///
/// Returns `AnalyticsError::InvalidWindow` if `window_days` is not positive
/// or two windows cannot be subtracted from `now`.
pub fn compare_windows(
    orders: &[OrderRecord],
    now: DateTime<Utc>,
    window_days: i64,
) -> Result<GrowthComparison, AnalyticsError> {
    let window = window_length(window_days, now, 2)?;
    let current_start = now - window;
    let previous_start = current_start - window;

    let mut current = Sum::default();
    let mut previous = Sum::default();
    let mut undated = 0;

    for order in orders {
        let Some(placed) = order.placed_at.as_ref() else {
            undated += 1;
            continue;
        };
        let instant = placed.instant();
        if instant >= current_start && instant < now {
            current.push(order.total());
        } else if instant >= previous_start && instant < current_start {
            previous.push(order.total());
        }
    }

    Ok(GrowthComparison {
        window_days,
        current_total: current.total,
        previous_total: previous.total,
        current_orders: current.counted,
        previous_orders: previous.counted,
        growth_percent: growth_percent(current.total, previous.total),
        excluded: undated + current.rejected + previous.rejected,
    })
}

/// Compute headline metrics for a snapshot.
///
/// # Errors
///
/// Returns `AnalyticsError::InvalidWindow` if `window_days` is rejected by
/// [`compare_windows`].
pub fn compute_metrics(
    orders: &[OrderRecord],
    now: DateTime<Utc>,
    window_days: i64,
) -> Result<MetricsSnapshot, AnalyticsError> {
    let growth = compare_windows(orders, now, window_days)?;
    let revenue = revenue(orders);

    if revenue.rejected > 0 {
        tracing::warn!(
            excluded = revenue.rejected,
            "Orders with unrepresentable values left out of revenue"
        );
    }
    if growth.excluded > 0 {
        tracing::debug!(
            excluded = growth.excluded,
            "Orders without a valid timestamp or value left out of growth windows"
        );
    }

    Ok(MetricsSnapshot {
        total_revenue: revenue.total,
        order_count: orders.len(),
        average_order_value: money::average(revenue.total, revenue.counted),
        excluded: revenue.rejected,
        growth_percent: growth.growth_percent,
        growth,
    })
}
