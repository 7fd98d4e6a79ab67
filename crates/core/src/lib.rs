//! Saborê Core - Order record types.
//!
//! This crate provides the types shared by every Saborê component:
//! - `analytics` - Pure aggregation engine over order snapshots
//! - `cli` - Command-line tool that fetches snapshots and prints reports
//!
//! # Architecture
//!
//! The core crate contains only types and decoding - no I/O, no HTTP
//! clients. Any JSON payload from the backend can be turned into
//! [`OrderRecord`]s here without pulling in a runtime.
//!
//! # Modules
//!
//! - [`types`] - Order records, line items, identifiers and timestamps
//! - [`snapshot`] - Lenient decoding of backend order payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

mod lenient;
pub mod snapshot;
pub mod types;

pub use snapshot::{Snapshot, SnapshotError};
pub use types::*;
