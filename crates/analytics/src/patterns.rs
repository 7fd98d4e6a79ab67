//! When orders happen: hour of day, day of week, month of year.
//!
//! All three projections read the wall clock as written in the timestamp,
//! so a `-03:00` order at 19:00 counts toward hour 19.

use std::collections::BTreeMap;

use chrono::{Month, Weekday};
use rust_decimal::Decimal;
use sabore_core::{OrderRecord, PlacedAt};
use serde::Serialize;

use crate::period::tally;

/// Order count per hour of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakHours {
    /// Hour `0..=23` to order count, only hours with orders.
    pub by_hour: BTreeMap<u32, usize>,
    pub excluded: usize,
}

impl PeakHours {
    /// Hour with the most orders. Ties go to the earliest hour.
    #[must_use]
    pub fn busiest_hour(&self) -> Option<u32> {
        self.by_hour
            .iter()
            .fold(None, |best: Option<(u32, usize)>, (&hour, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((hour, count)),
            })
            .map(|(hour, _)| hour)
    }

    /// Order count for `hour`, zero when none.
    #[must_use]
    pub fn count_at(&self, hour: u32) -> usize {
        self.by_hour.get(&hour).copied().unwrap_or(0)
    }
}

/// Sales for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayTotal {
    /// `0` = Monday through `6` = Sunday.
    pub weekday: u32,
    pub total: Decimal,
    pub orders: usize,
}

impl WeekdayTotal {
    #[must_use]
    pub fn day(&self) -> Option<Weekday> {
        u8::try_from(self.weekday)
            .ok()
            .and_then(|index| Weekday::try_from(index).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayPerformance {
    /// Ascending by weekday index, only days with orders.
    pub days: Vec<WeekdayTotal>,
    pub excluded: usize,
}

impl WeekdayPerformance {
    /// Total for a weekday index, if that day has orders.
    #[must_use]
    pub fn total_for(&self, weekday: u32) -> Option<Decimal> {
        self.days
            .iter()
            .find(|d| d.weekday == weekday)
            .map(|d| d.total)
    }
}

/// Sales for one calendar month, all years combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    /// `1` = January through `12` = December.
    pub month: u32,
    pub total: Decimal,
    pub orders: usize,
}

impl MonthTotal {
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        u8::try_from(self.month)
            .ok()
            .and_then(|index| Month::try_from(index).ok())
            .map(|month| month.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seasonality {
    /// Ascending by month, only months with orders.
    pub months: Vec<MonthTotal>,
    pub excluded: usize,
}

impl Seasonality {
    #[must_use]
    pub fn total_for(&self, month: u32) -> Option<Decimal> {
        self.months
            .iter()
            .find(|m| m.month == month)
            .map(|m| m.total)
    }
}

/// Count orders per hour of day.
#[must_use]
pub fn peak_hours(orders: &[OrderRecord]) -> PeakHours {
    let (tallies, excluded) = tally(orders, PlacedAt::hour);
    PeakHours {
        by_hour: tallies
            .into_iter()
            .map(|(hour, tally)| (hour, tally.orders))
            .collect(),
        excluded,
    }
}

/// Sum order values per day of the week.
#[must_use]
pub fn weekday_performance(orders: &[OrderRecord]) -> WeekdayPerformance {
    let (tallies, excluded) = tally(orders, PlacedAt::weekday_index);
    WeekdayPerformance {
        days: tallies
            .into_iter()
            .map(|(weekday, tally)| WeekdayTotal {
                weekday,
                total: tally.total,
                orders: tally.orders,
            })
            .collect(),
        excluded,
    }
}

/// Sum order values per month of the year.
#[must_use]
pub fn seasonality(orders: &[OrderRecord]) -> Seasonality {
    let (tallies, excluded) = tally(orders, PlacedAt::month);
    Seasonality {
        months: tallies
            .into_iter()
            .map(|(month, tally)| MonthTotal {
                month,
                total: tally.total,
                orders: tally.orders,
            })
            .collect(),
        excluded,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(placed_at: &str, total: i64) -> OrderRecord {
        OrderRecord::new(placed_at)
            .with_placed_at(placed_at)
            .with_total(Decimal::from(total))
    }

    #[test]
    fn test_peak_hour_scenario() {
        let orders = vec![
            order("2024-01-01T12:10:00", 10),
            order("2024-01-01T12:50:00", 10),
            order("2024-01-01T19:00:00", 10),
        ];
        let peaks = peak_hours(&orders);
        assert_eq!(peaks.count_at(12), 2);
        assert_eq!(peaks.count_at(19), 1);
        assert_eq!(peaks.count_at(3), 0);
        assert_eq!(peaks.busiest_hour(), Some(12));
    }

    #[test]
    fn test_busiest_hour_tie_goes_to_earliest() {
        let orders = vec![
            order("2024-01-01T20:00:00", 1),
            order("2024-01-01T11:00:00", 1),
        ];
        assert_eq!(peak_hours(&orders).busiest_hour(), Some(11));
        assert_eq!(peak_hours(&[]).busiest_hour(), None);
    }

    #[test]
    fn test_hours_use_wall_clock() {
        let orders = vec![order("2024-01-01T19:30:00-03:00", 1)];
        assert_eq!(peak_hours(&orders).count_at(19), 1);
    }

    #[test]
    fn test_weekday_indices() {
        let orders = vec![
            // Monday
            order("2024-01-01T12:00:00", 10),
            // Sunday
            order("2024-01-07T12:00:00", 30),
            order("2024-01-08T12:00:00", 5),
        ];
        let performance = weekday_performance(&orders);
        assert_eq!(performance.total_for(0), Some(Decimal::from(15)));
        assert_eq!(performance.total_for(6), Some(Decimal::from(30)));
        assert_eq!(performance.days.first().unwrap().orders, 2);
        assert_eq!(performance.days.first().unwrap().day(), Some(Weekday::Mon));
        assert_eq!(performance.days.last().unwrap().day(), Some(Weekday::Sun));
    }

    #[test]
    fn test_seasonality_merges_years() {
        let orders = vec![
            order("2023-12-24T20:00:00", 100),
            order("2024-12-24T20:00:00", 150),
            order("2024-03-01T20:00:00", 40),
        ];
        let seasons = seasonality(&orders);
        assert_eq!(seasons.months.len(), 2);
        assert_eq!(seasons.total_for(12), Some(Decimal::from(250)));
        assert_eq!(seasons.months.first().unwrap().name(), Some("March"));
    }

    #[test]
    fn test_projections_report_exclusions() {
        let orders = vec![order("2024-01-01T12:00:00", 1), order("??", 1)];
        assert_eq!(peak_hours(&orders).excluded, 1);
        assert_eq!(weekday_performance(&orders).excluded, 1);
        assert_eq!(seasonality(&orders).excluded, 1);
    }
}
