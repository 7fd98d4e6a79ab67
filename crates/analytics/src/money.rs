//! Overflow-checked arithmetic on order values.
//!
//! An amount that cannot be added to a running total leaves that record out
//! of the total instead of aborting the analysis.

use rust_decimal::Decimal;

/// `total + value`, or `None` when `value` is missing or the sum overflows.
pub fn add(total: Decimal, value: Option<Decimal>) -> Option<Decimal> {
    value.and_then(|value| total.checked_add(value))
}

/// Running sum of order values with a count of the records left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sum {
    pub total: Decimal,
    pub counted: usize,
    pub rejected: usize,
}

impl Sum {
    /// Add `value`, or count it as rejected. Returns whether it was added.
    pub fn push(&mut self, value: Option<Decimal>) -> bool {
        if let Some(total) = add(self.total, value) {
            self.total = total;
            self.counted += 1;
            true
        } else {
            self.rejected += 1;
            false
        }
    }
}

/// `total / count`, zero for no values.
pub fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    total
        .checked_div(Decimal::from(count))
        .unwrap_or(Decimal::ZERO)
}

/// Mean of `values`, zero when empty.
///
/// When the plain sum overflows, the mean is taken as `Σ (value / n)`.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let n = Decimal::from(values.len());
    values
        .iter()
        .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(*value))
        .and_then(|sum| sum.checked_div(n))
        .or_else(|| {
            values
                .iter()
                .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(value.checked_div(n)?))
        })
        .unwrap_or(Decimal::MAX)
}
