//! Core types for Saborê.
//!
//! This module provides the normalized representation of backend orders.

pub mod id;
pub mod order;
pub mod timestamp;

pub use id::*;
pub use order::{LineItem, OrderRecord};
pub use timestamp::PlacedAt;
