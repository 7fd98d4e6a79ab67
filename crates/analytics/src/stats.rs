//! Distribution of order values.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sabore_core::{OrderId, OrderRecord};
use serde::Serialize;

use crate::money;

/// Summary statistics over every order's value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderValueStats {
    pub count: usize,
    pub mean: Decimal,
    pub median: Decimal,
    /// Sample standard deviation, `0.0` for a single order.
    pub std_dev: f64,
    pub largest: OrderExtreme,
    pub smallest: OrderExtreme,
    /// Orders left out because their value could not be represented.
    pub excluded: usize,
}

/// The order behind a largest or smallest value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderExtreme {
    pub id: Option<OrderId>,
    pub value: Decimal,
    /// Timestamp exactly as received.
    pub placed_at: Option<String>,
}

impl OrderExtreme {
    fn of(order: &OrderRecord, value: Decimal) -> Self {
        Self {
            id: order.id.clone(),
            value,
            placed_at: order.placed_at_raw.clone(),
        }
    }
}

/// Compute value statistics, or `None` when no order has a usable value.
///
/// Timestamps play no part; an undated order still has a value.
#[must_use]
pub fn order_value_stats(orders: &[OrderRecord]) -> Option<OrderValueStats> {
    let values: Vec<(&OrderRecord, Decimal)> = orders
        .iter()
        .filter_map(|order| order.total().map(|value| (order, value)))
        .collect();
    let (first, rest) = values.split_first()?;

    // Strict comparisons keep the first occurrence on ties.
    let (largest, smallest) = rest.iter().fold((first, first), |(hi, lo), candidate| {
        (
            if candidate.1 > hi.1 { candidate } else { hi },
            if candidate.1 < lo.1 { candidate } else { lo },
        )
    });

    let mut sorted: Vec<Decimal> = values.iter().map(|(_, value)| *value).collect();
    sorted.sort_unstable();
    let mean = money::mean(&sorted);
    let median = median_of_sorted(&sorted)?;

    Some(OrderValueStats {
        count: values.len(),
        mean,
        median,
        std_dev: sample_std_dev(&sorted, mean),
        largest: OrderExtreme::of(largest.0, largest.1),
        smallest: OrderExtreme::of(smallest.0, smallest.1),
        excluded: orders.len() - values.len(),
    })
}

fn median_of_sorted(sorted: &[Decimal]) -> Option<Decimal> {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted.get(mid).copied()
    } else {
        let upper = sorted.get(mid)?;
        let lower = sorted.get(mid.checked_sub(1)?)?;
        Some(money::mean(&[*lower, *upper]))
    }
}

#[allow(clippy::cast_precision_loss)]
fn sample_std_dev(values: &[Decimal], mean: Decimal) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean.to_f64().unwrap_or(0.0);
    let squared: f64 = values
        .iter()
        .filter_map(|value| value.to_f64())
        .map(|value| (value - mean).powi(2))
        .sum();
    (squared / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: &str, total: i64) -> OrderRecord {
        OrderRecord::new(id)
            .with_placed_at("2024-02-01T12:00:00")
            .with_total(Decimal::from(total))
    }

    #[test]
    fn test_empty_is_none() {
        assert!(order_value_stats(&[]).is_none());
    }

    #[test]
    fn test_single_order() {
        let stats = order_value_stats(&[order("1", 42)]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, Decimal::from(42));
        assert_eq!(stats.median, Decimal::from(42));
        assert!(stats.std_dev.abs() < f64::EPSILON);
        assert_eq!(stats.largest, stats.smallest);
    }

    #[test]
    fn test_even_count_median() {
        let orders = vec![order("1", 10), order("2", 40), order("3", 20), order("4", 30)];
        let stats = order_value_stats(&orders).unwrap();
        assert_eq!(stats.median, Decimal::from(25));
        assert_eq!(stats.mean, Decimal::from(25));
    }

    #[test]
    fn test_sample_std_dev() {
        // values 2, 4, 4, 4, 5, 5, 7, 9: sample variance 32 / 7
        let orders: Vec<_> = [2, 4, 4, 4, 5, 5, 7, 9]
            .iter()
            .enumerate()
            .map(|(i, v)| order(&i.to_string(), *v))
            .collect();
        let stats = order_value_stats(&orders).unwrap();
        assert!((stats.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_extremes_first_occurrence_wins() {
        let orders = vec![order("a", 5), order("b", 9), order("c", 9), order("d", 5)];
        let stats = order_value_stats(&orders).unwrap();
        assert_eq!(stats.largest.id.unwrap().as_str(), "b");
        assert_eq!(stats.smallest.id.unwrap().as_str(), "a");
        assert_eq!(stats.largest.placed_at.as_deref(), Some("2024-02-01T12:00:00"));
    }

    #[test]
    fn test_undated_orders_included() {
        let orders = vec![
            order("1", 10),
            OrderRecord::new("2").with_total(Decimal::from(30)),
        ];
        let stats = order_value_stats(&orders).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.largest.placed_at, None);
    }

    #[test]
    fn test_unrepresentable_values_are_excluded() {
        let orders = vec![
            order("1", 10),
            OrderRecord::new("2").with_item(sabore_core::LineItem::new("x", Decimal::MAX, 2)),
            order("3", 20),
        ];
        let stats = order_value_stats(&orders).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.mean, Decimal::from(15));
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let orders = vec![
            OrderRecord::new("a").with_total(Decimal::MAX),
            OrderRecord::new("b").with_total(Decimal::MAX),
        ];
        let stats = order_value_stats(&orders).unwrap();
        assert_eq!(stats.count, 2);
        assert!(stats.median > Decimal::ZERO);
        assert_eq!(stats.largest.id.unwrap().as_str(), "a");
    }
}
