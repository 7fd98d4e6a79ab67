//! Field decoders that treat wrongly-typed values as absent.
//!
//! The backend is loosely typed: amounts arrive as numbers or numeric
//! strings, ids as numbers or strings, and optional fields as `null`. A bad
//! field must never poison the whole record, so every decoder here reads a
//! raw [`Value`] first and maps anything unusable to `None`.
//!
//! Amounts are never negative and quantities are positive; values outside
//! those ranges are unusable too.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::OrderId;

pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(decimal_from_value)
        .filter(|amount| *amount >= Decimal::ZERO))
}

pub fn quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let quantity: Option<u32> = match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(quantity.filter(|q| *q > 0))
}

pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn order_id<'de, D>(deserializer: D) -> Result<Option<OrderId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(OrderId::from(s)),
        Some(Value::Number(n)) => Some(OrderId::new(n.to_string())),
        _ => None,
    })
}

/// Decode an array, keeping only the elements that decode as `T`.
pub fn items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "decimal")]
        amount: Option<Decimal>,
        #[serde(default, deserialize_with = "quantity")]
        qty: Option<u32>,
        #[serde(default, deserialize_with = "text")]
        label: Option<String>,
    }

    fn decode(json: &str) -> Fields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decimal_from_number_and_string() {
        assert_eq!(decode(r#"{"amount": 10.5}"#).amount, Some(Decimal::new(105, 1)));
        assert_eq!(decode(r#"{"amount": "7.25"}"#).amount, Some(Decimal::new(725, 2)));
        assert_eq!(decode(r#"{"amount": 3}"#).amount, Some(Decimal::from(3)));
    }

    #[test]
    fn test_decimal_wrong_type_is_absent() {
        assert_eq!(decode(r#"{"amount": "abc"}"#).amount, None);
        assert_eq!(decode(r#"{"amount": [1]}"#).amount, None);
        assert_eq!(decode(r#"{"amount": null}"#).amount, None);
        assert_eq!(decode("{}").amount, None);
    }

    #[test]
    fn test_quantity_rejects_negative_and_fractional() {
        assert_eq!(decode(r#"{"qty": 2}"#).qty, Some(2));
        assert_eq!(decode(r#"{"qty": "4"}"#).qty, Some(4));
        assert_eq!(decode(r#"{"qty": -1}"#).qty, None);
        assert_eq!(decode(r#"{"qty": 1.5}"#).qty, None);
    }

    #[test]
    fn test_negative_amount_is_absent() {
        assert_eq!(decode(r#"{"amount": -80}"#).amount, None);
        assert_eq!(decode(r#"{"amount": "-0.01"}"#).amount, None);
        assert_eq!(decode(r#"{"amount": 0}"#).amount, Some(Decimal::ZERO));
    }

    #[test]
    fn test_zero_quantity_is_absent() {
        assert_eq!(decode(r#"{"qty": 0}"#).qty, None);
        assert_eq!(decode(r#"{"qty": "0"}"#).qty, None);
    }

    #[test]
    fn test_text_accepts_numbers() {
        assert_eq!(decode(r#"{"label": 12}"#).label.as_deref(), Some("12"));
        assert_eq!(decode(r#"{"label": true}"#).label, None);
    }
}
