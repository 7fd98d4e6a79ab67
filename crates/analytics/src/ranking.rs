//! Top-selling items.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sabore_core::OrderRecord;
use serde::Serialize;

use crate::error::AnalyticsError;
use crate::money;

/// Number of items kept when the caller has no preference.
pub const DEFAULT_TOP_N: usize = 10;

/// Totals for one item name across a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemAggregate {
    pub name: String,
    pub total_quantity: u64,
    /// `Σ unit_value × quantity`.
    pub total_value: Decimal,
}

/// Items ranked by quantity sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRanking {
    /// At most `limit` items, highest quantity first.
    pub items: Vec<ItemAggregate>,
    /// Distinct item names seen before truncation.
    pub distinct_items: usize,
    /// Line items left out because they had no name or no representable
    /// value.
    pub excluded: usize,
}

impl ItemRanking {
    /// The best-selling item, if any.
    #[must_use]
    pub fn top(&self) -> Option<&ItemAggregate> {
        self.items.first()
    }
}

/// Rank items by total quantity, keeping the top `limit`.
///
/// Items are keyed by their exact name. Equal quantities keep the order in
/// which the names first appeared in the snapshot.
///
/// # Errors
///
/// Returns `AnalyticsError::InvalidTopN` if `limit` is zero.
pub fn rank_items(orders: &[OrderRecord], limit: usize) -> Result<ItemRanking, AnalyticsError> {
    if limit == 0 {
        return Err(AnalyticsError::InvalidTopN);
    }

    let mut aggregates: Vec<ItemAggregate> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut excluded = 0;

    for item in orders.iter().flat_map(|order| &order.line_items) {
        let (Some(name), Some(line_total)) = (item.name.as_deref(), item.line_total()) else {
            excluded += 1;
            continue;
        };

        let position = *positions.entry(name).or_insert_with(|| {
            aggregates.push(ItemAggregate {
                name: name.to_owned(),
                total_quantity: 0,
                total_value: Decimal::ZERO,
            });
            aggregates.len() - 1
        });

        let Some(aggregate) = aggregates.get_mut(position) else {
            continue;
        };
        match money::add(aggregate.total_value, Some(line_total)) {
            Some(total_value) => {
                aggregate.total_value = total_value;
                aggregate.total_quantity = aggregate
                    .total_quantity
                    .saturating_add(u64::from(item.quantity));
            }
            None => excluded += 1,
        }
    }

    let distinct_items = aggregates.len();
    // `sort_by` is stable, so ties keep first-seen order.
    aggregates.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
    aggregates.truncate(limit);

    if excluded > 0 {
        tracing::debug!(excluded, "Skipped unnamed or unvalued line items in ranking");
    }

    Ok(ItemRanking {
        items: aggregates,
        distinct_items,
        excluded,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sabore_core::LineItem;

    use super::*;

    fn order_with(items: Vec<LineItem>) -> OrderRecord {
        items
            .into_iter()
            .fold(OrderRecord::new("o"), OrderRecord::with_item)
    }

    fn item(name: &str, value: i64, quantity: u32) -> LineItem {
        LineItem::new(name, Decimal::from(value), quantity)
    }

    #[test]
    fn test_top_one_accumulates_across_orders() {
        let orders = vec![
            order_with(vec![item("X-Burger", 25, 2), item("Fries", 10, 1)]),
            order_with(vec![item("X-Burger", 25, 1)]),
        ];
        let ranking = rank_items(&orders, 1).unwrap();
        assert_eq!(ranking.items.len(), 1);
        let top = ranking.top().unwrap();
        assert_eq!(top.name, "X-Burger");
        assert_eq!(top.total_quantity, 3);
        assert_eq!(top.total_value, Decimal::from(75));
        assert_eq!(ranking.distinct_items, 2);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let orders = vec![
            order_with(vec![item("Suco", 8, 2)]),
            order_with(vec![item("Agua", 4, 2), item("Pastel", 9, 5)]),
        ];
        let ranking = rank_items(&orders, 10).unwrap();
        let names: Vec<_> = ranking.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Pastel", "Suco", "Agua"]);
    }

    #[test]
    fn test_names_are_not_normalized() {
        let orders = vec![order_with(vec![item("Coxinha", 6, 1), item("coxinha", 6, 1)])];
        let ranking = rank_items(&orders, 10).unwrap();
        assert_eq!(ranking.distinct_items, 2);
    }

    #[test]
    fn test_orders_without_items_contribute_nothing() {
        let orders = vec![OrderRecord::new("1").with_total(Decimal::from(50))];
        let ranking = rank_items(&orders, 5).unwrap();
        assert!(ranking.items.is_empty());
        assert!(ranking.top().is_none());
    }

    #[test]
    fn test_unnamed_items_are_excluded() {
        let mut unnamed = item("ignored", 3, 4);
        unnamed.name = None;
        let orders = vec![order_with(vec![unnamed, item("Pudim", 7, 1)])];
        let ranking = rank_items(&orders, 5).unwrap();
        assert_eq!(ranking.excluded, 1);
        assert_eq!(ranking.items.len(), 1);
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert_eq!(rank_items(&[], 0), Err(AnalyticsError::InvalidTopN));
    }

    #[test]
    fn test_truncates_to_limit() {
        let orders = vec![order_with(vec![
            item("A", 1, 5),
            item("B", 1, 4),
            item("C", 1, 3),
        ])];
        let ranking = rank_items(&orders, 2).unwrap();
        assert_eq!(ranking.items.len(), 2);
        assert_eq!(ranking.distinct_items, 3);
    }

    #[test]
    fn test_overflowing_line_items_are_excluded() {
        let orders = vec![
            order_with(vec![item("Feijoada", 30, 1)]),
            order_with(vec![LineItem::new("Feijoada", Decimal::MAX, 1)]),
            order_with(vec![LineItem::new("Caviar", Decimal::MAX, 3)]),
        ];
        let ranking = rank_items(&orders, 5).unwrap();
        assert_eq!(ranking.excluded, 2);
        assert_eq!(ranking.distinct_items, 1);
        let top = ranking.top().unwrap();
        assert_eq!(top.name, "Feijoada");
        assert_eq!(top.total_quantity, 1);
        assert_eq!(top.total_value, Decimal::from(30));
    }
}
