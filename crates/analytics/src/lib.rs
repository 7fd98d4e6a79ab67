//! Saborê Analytics - Sales aggregation engine.
//!
//! Turns a snapshot of [`OrderRecord`]s into derived sales metrics. Every
//! operation is a pure function of its inputs: no I/O, no shared state, no
//! clock reads (the reference time is always a parameter).
//!
//! # Record Exclusion
//!
//! A record missing a field an analysis needs (usually a parseable
//! timestamp) is left out of that analysis only, and the result reports how
//! many records were left out. Empty input is always valid. The only errors
//! are invalid configuration parameters ([`AnalyticsError`]).
//!
//! # Modules
//!
//! - [`period`] - Day/week/month buckets
//! - [`ranking`] - Top items by quantity
//! - [`metrics`] - Revenue, order count, average ticket, window growth
//! - [`patterns`] - Peak hours, weekday performance, seasonality
//! - [`stats`] - Order value distribution
//! - [`trend`] - Daily trend and moving-average forecast
//! - [`report`] - Everything above in one pass

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod metrics;
mod money;
pub mod patterns;
pub mod period;
pub mod ranking;
pub mod report;
pub mod stats;
pub mod trend;

pub use config::AnalyticsConfig;
pub use error::AnalyticsError;
pub use metrics::{GrowthComparison, MetricsSnapshot, compute_metrics};
pub use patterns::{
    PeakHours, Seasonality, WeekdayPerformance, peak_hours, seasonality, weekday_performance,
};
pub use period::{Granularity, PeriodBucket, PeriodSeries, aggregate_by_period};
pub use ranking::{ItemAggregate, ItemRanking, rank_items};
pub use report::{SalesReport, build_report};
pub use stats::{OrderExtreme, OrderValueStats, order_value_stats};
pub use trend::{SalesForecast, SalesTrend, TrendDirection, analyze_trend, forecast_sales};

pub use sabore_core::OrderRecord;
