//! Calendar period buckets (day, ISO week, month).
//!
//! Bucket keys are zero-padded (`2024-01-05`, `2024-W01`, `2024-01`), so the
//! lexical order of keys is also their chronological order and a
//! `BTreeMap<String, _>` yields the series already sorted.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sabore_core::{OrderRecord, PlacedAt};
use serde::{Deserialize, Serialize};

use crate::money;

/// Period size for time-series aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Resolve a granularity name, falling back to [`Granularity::Day`] for
    /// names it does not recognize.
    ///
    /// Accepts English and Portuguese names, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "day" | "daily" | "dia" => Self::Day,
            "week" | "weekly" | "semana" => Self::Week,
            "month" | "monthly" | "mes" | "mês" => Self::Month,
            other => {
                tracing::debug!(granularity = other, "Unknown granularity, using day");
                Self::Day
            }
        }
    }

    /// The bucket key for `date`.
    #[must_use]
    pub fn bucket_key(self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = date.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Self::Month => date.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

/// Summed order value for one calendar period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodBucket {
    /// `YYYY-MM-DD`, `YYYY-Www` or `YYYY-MM`.
    pub key: String,
    pub total: Decimal,
    pub order_count: usize,
}

/// Period buckets sorted ascending by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSeries {
    pub granularity: Granularity,
    pub buckets: Vec<PeriodBucket>,
    /// Orders left out for lack of a parseable timestamp or a representable
    /// value.
    pub excluded: usize,
}

impl PeriodSeries {
    /// Total for `key`, if that period has any orders.
    #[must_use]
    pub fn total_for(&self, key: &str) -> Option<Decimal> {
        self.buckets.iter().find(|b| b.key == key).map(|b| b.total)
    }

    /// Bucket totals in chronological order.
    pub fn totals(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.buckets.iter().map(|b| b.total)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Bucket orders by `granularity` and sum their values.
///
/// Orders without a parseable timestamp, or whose value cannot be added to
/// their bucket, are skipped and counted in [`PeriodSeries::excluded`].
pub fn aggregate_by_period<'a, I>(orders: I, granularity: Granularity) -> PeriodSeries
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let (tallies, excluded) = tally(orders, |placed| granularity.bucket_key(placed.date()));

    let buckets = tallies
        .into_iter()
        .map(|(key, tally)| PeriodBucket {
            key,
            total: tally.total,
            order_count: tally.orders,
        })
        .collect();

    PeriodSeries {
        granularity,
        buckets,
        excluded,
    }
}

/// Running sum and count for one bucket.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Tally {
    pub total: Decimal,
    pub orders: usize,
}

/// Group timestamped orders by `key_fn`, returning the sorted tallies and the
/// number of orders without a usable timestamp or value.
pub(crate) fn tally<'a, I, K, F>(orders: I, key_fn: F) -> (BTreeMap<K, Tally>, usize)
where
    I: IntoIterator<Item = &'a OrderRecord>,
    K: Ord,
    F: Fn(&PlacedAt) -> K,
{
    let mut tallies: BTreeMap<K, Tally> = BTreeMap::new();
    let mut excluded = 0;

    for order in orders {
        let Some(placed) = order.placed_at.as_ref() else {
            excluded += 1;
            continue;
        };
        let key = key_fn(placed);
        let running = tallies.get(&key).map_or(Decimal::ZERO, |t| t.total);
        let Some(total) = money::add(running, order.total()) else {
            excluded += 1;
            continue;
        };
        let entry = tallies.entry(key).or_default();
        entry.total = total;
        entry.orders += 1;
    }

    (tallies, excluded)
}
