//! Order records as delivered by the restaurant backend.
//!
//! The wire format uses the backend's field names (`data_pedido`,
//! `valor_total`, `itens`, ...). Decoding is lenient: a field with the wrong
//! type or an out-of-range value (negative amount, zero quantity) is treated
//! as missing, and a line item that is not an object is dropped. Whether a record is usable for a particular analysis is decided
//! by that analysis, not here.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{OrderId, PlacedAt};
use crate::lenient;

/// One order in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireOrder")]
pub struct OrderRecord {
    /// Backend identifier, if the payload carried one.
    pub id: Option<OrderId>,
    /// The timestamp string exactly as received.
    pub placed_at_raw: Option<String>,
    /// Parsed form of `placed_at_raw`; `None` when missing or unparseable.
    pub placed_at: Option<PlacedAt>,
    /// Declared order total (`valor_total`).
    pub total_value: Option<Decimal>,
    pub line_items: Vec<LineItem>,
    pub customer: Option<String>,
    pub status: Option<String>,
}

impl OrderRecord {
    /// Create an empty order with the given id.
    #[must_use]
    pub fn new(id: impl Into<OrderId>) -> Self {
        Self {
            id: Some(id.into()),
            placed_at_raw: None,
            placed_at: None,
            total_value: None,
            line_items: Vec::new(),
            customer: None,
            status: None,
        }
    }

    /// Set the placement timestamp from its textual form.
    #[must_use]
    pub fn with_placed_at(mut self, raw: &str) -> Self {
        self.placed_at = PlacedAt::parse(raw);
        self.placed_at_raw = Some(raw.to_owned());
        self
    }

    /// Set the declared order total.
    #[must_use]
    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total_value = Some(total);
        self
    }

    /// Append a line item.
    #[must_use]
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    /// The order's value.
    ///
    /// Uses the declared total when present; otherwise sums
    /// `unit_value × quantity` over the line items (zero without items).
    /// Returns `None` when the derived sum does not fit in a `Decimal`.
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        match self.total_value {
            Some(total) => Some(total),
            None => self
                .line_items
                .iter()
                .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?)),
        }
    }
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireLineItem")]
pub struct LineItem {
    /// Display name, also the ranking key.
    pub name: Option<String>,
    pub unit_value: Decimal,
    pub quantity: u32,
    pub category: Option<String>,
}

impl LineItem {
    /// Quantity assumed when the payload omits it or sends zero.
    pub const DEFAULT_QUANTITY: u32 = 1;

    /// Create a named line item.
    #[must_use]
    pub fn new(name: impl Into<String>, unit_value: Decimal, quantity: u32) -> Self {
        Self {
            name: Some(name.into()),
            unit_value,
            quantity,
            category: None,
        }
    }

    /// Set the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// `unit_value × quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_value.checked_mul(Decimal::from(self.quantity))
    }
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Deserialize)]
struct WireOrder {
    #[serde(default, deserialize_with = "lenient::order_id")]
    id: Option<OrderId>,
    #[serde(default, rename = "data_pedido", deserialize_with = "lenient::text")]
    placed_at: Option<String>,
    #[serde(default, rename = "valor_total", deserialize_with = "lenient::decimal")]
    total_value: Option<Decimal>,
    #[serde(default, rename = "itens", deserialize_with = "lenient::items")]
    line_items: Vec<LineItem>,
    #[serde(default, rename = "cliente", deserialize_with = "lenient::text")]
    customer: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    status: Option<String>,
}

impl From<WireOrder> for OrderRecord {
    fn from(wire: WireOrder) -> Self {
        Self {
            id: wire.id,
            placed_at: wire.placed_at.as_deref().and_then(PlacedAt::parse),
            placed_at_raw: wire.placed_at,
            total_value: wire.total_value,
            line_items: wire.line_items,
            customer: wire.customer,
            status: wire.status,
        }
    }
}

#[derive(Deserialize)]
struct WireLineItem {
    #[serde(default, rename = "nome", deserialize_with = "lenient::text")]
    name: Option<String>,
    #[serde(default, rename = "preco_unitario", deserialize_with = "lenient::decimal")]
    unit_price: Option<Decimal>,
    #[serde(default, rename = "valor", deserialize_with = "lenient::decimal")]
    value: Option<Decimal>,
    #[serde(default, rename = "quantidade", deserialize_with = "lenient::quantity")]
    quantity: Option<u32>,
    #[serde(default, rename = "categoria", deserialize_with = "lenient::text")]
    category: Option<String>,
}

impl From<WireLineItem> for LineItem {
    fn from(wire: WireLineItem) -> Self {
        Self {
            name: wire.name,
            unit_value: wire.unit_price.or(wire.value).unwrap_or_default(),
            quantity: wire.quantity.unwrap_or(Self::DEFAULT_QUANTITY),
            category: wire.category,
        }
    }
}
