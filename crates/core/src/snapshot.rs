//! Decoding of backend order payloads into a snapshot.
//!
//! The order list endpoint returns either a bare JSON array or, when the
//! backend paginates, an object wrapping the array. Elements that are not
//! JSON objects cannot be orders; they are counted and skipped.

use serde_json::Value;
use thiserror::Error;

use crate::types::OrderRecord;

/// Keys under which a wrapped payload may carry its order array.
const WRAPPER_KEYS: &[&str] = &["content", "pedidos", "data"];

/// Errors that can occur when decoding a snapshot payload.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is JSON but holds no order array.
    #[error("payload holds no order array (expected a JSON array or an object with one of: {})", WRAPPER_KEYS.join(", "))]
    NoOrderArray,
}

/// The full set of orders fetched for one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Decoded orders, in payload order.
    pub orders: Vec<OrderRecord>,
    /// Number of array elements that were not JSON objects.
    pub skipped: usize,
}

impl Snapshot {
    /// Decode a snapshot from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Json` if the bytes are not JSON and
    /// `SnapshotError::NoOrderArray` if no order array can be located.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Decode a snapshot from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::NoOrderArray` if `value` is neither an array
    /// nor an object wrapping one under a known key.
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        let elements = match value {
            Value::Array(elements) => elements,
            Value::Object(mut map) => WRAPPER_KEYS
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(elements)) => Some(elements),
                    _ => None,
                })
                .ok_or(SnapshotError::NoOrderArray)?,
            _ => return Err(SnapshotError::NoOrderArray),
        };

        let mut orders = Vec::with_capacity(elements.len());
        let mut skipped = 0;
        for element in elements {
            if !element.is_object() {
                skipped += 1;
                continue;
            }
            match serde_json::from_value::<OrderRecord>(element) {
                Ok(order) => orders.push(order),
                Err(_) => skipped += 1,
            }
        }

        Ok(Self { orders, skipped })
    }

    /// Number of decoded orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the snapshot holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl From<Vec<OrderRecord>> for Snapshot {
    fn from(orders: Vec<OrderRecord>) -> Self {
        Self { orders, skipped: 0 }
    }
}
