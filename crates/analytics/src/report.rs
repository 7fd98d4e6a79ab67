//! Full sales report in one call.

use chrono::{DateTime, Utc};
use sabore_core::OrderRecord;
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::metrics::{MetricsSnapshot, compute_metrics};
use crate::patterns::{
    PeakHours, Seasonality, WeekdayPerformance, peak_hours, seasonality, weekday_performance,
};
use crate::period::{Granularity, PeriodSeries, aggregate_by_period};
use crate::ranking::{ItemRanking, rank_items};
use crate::stats::{OrderValueStats, order_value_stats};
use crate::trend::{SalesForecast, SalesTrend, analyze_trend, forecast_sales};

/// Every analysis over one snapshot, computed against the same `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub generated_at: DateTime<Utc>,
    pub metrics: MetricsSnapshot,
    /// `None` when the snapshot has no orders.
    pub statistics: Option<OrderValueStats>,
    pub trend: SalesTrend,
    pub forecast: SalesForecast,
    pub peak_hours: PeakHours,
    pub weekday_performance: WeekdayPerformance,
    pub seasonality: Seasonality,
    pub top_items: ItemRanking,
    pub daily: PeriodSeries,
    pub weekly: PeriodSeries,
    pub monthly: PeriodSeries,
}

/// Run every analysis over `orders`.
///
/// The configuration is validated before any record is read.
///
/// # Errors
///
/// Returns the first `AnalyticsError` raised by configuration validation or
/// by an individual analysis.
#[tracing::instrument(skip_all, fields(orders = orders.len()))]
pub fn build_report(
    orders: &[OrderRecord],
    now: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> Result<SalesReport, AnalyticsError> {
    config.validate()?;

    let report = SalesReport {
        generated_at: now,
        metrics: compute_metrics(orders, now, config.window_days)?,
        statistics: order_value_stats(orders),
        trend: analyze_trend(orders, now, config.trend_days)?,
        forecast: forecast_sales(orders, config.forecast_days)?,
        peak_hours: peak_hours(orders),
        weekday_performance: weekday_performance(orders),
        seasonality: seasonality(orders),
        top_items: rank_items(orders, config.top_n)?,
        daily: aggregate_by_period(orders, Granularity::Day),
        weekly: aggregate_by_period(orders, Granularity::Week),
        monthly: aggregate_by_period(orders, Granularity::Month),
    };

    tracing::info!(
        revenue = %report.metrics.total_revenue,
        growth_percent = %report.metrics.growth_percent,
        excluded = report.daily.excluded,
        "Built sales report"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use sabore_core::LineItem;

    use super::*;
    use crate::trend::TrendDirection;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_snapshot_report() {
        let report = build_report(&[], now(), &AnalyticsConfig::default()).unwrap();
        assert_eq!(report.metrics.order_count, 0);
        assert!(report.statistics.is_none());
        assert_eq!(report.trend.direction, TrendDirection::Stable);
        assert_eq!(report.forecast.values.len(), 7);
        assert!(report.top_items.items.is_empty());
        assert!(report.daily.is_empty());
        assert_eq!(report.generated_at, now());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = AnalyticsConfig {
            top_n: 0,
            ..AnalyticsConfig::default()
        };
        assert_eq!(
            build_report(&[], now(), &config),
            Err(AnalyticsError::InvalidTopN)
        );
    }

    #[test]
    fn test_report_sections_agree() {
        let orders = vec![
            OrderRecord::new("1")
                .with_placed_at("2024-04-20T12:30:00-03:00")
                .with_item(LineItem::new("Feijoada", Decimal::from(45), 2)),
            OrderRecord::new("2")
                .with_placed_at("2024-04-21 19:00:00")
                .with_total(Decimal::from(30))
                .with_item(LineItem::new("Feijoada", Decimal::from(45), 1)),
        ];
        let report = build_report(&orders, now(), &AnalyticsConfig::default()).unwrap();

        assert_eq!(report.metrics.total_revenue, Decimal::from(120));
        let daily: Decimal = report.daily.totals().sum();
        let monthly: Decimal = report.monthly.totals().sum();
        assert_eq!(daily, report.metrics.total_revenue);
        assert_eq!(monthly, report.metrics.total_revenue);
        assert_eq!(report.top_items.top().unwrap().total_quantity, 3);
        assert_eq!(report.peak_hours.busiest_hour(), Some(12));
        assert_eq!(report.statistics.unwrap().largest.value, Decimal::from(90));
    }

    #[test]
    fn test_report_serializes() {
        let report = build_report(&[], now(), &AnalyticsConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["trend"]["direction"], "stable");
        assert_eq!(json["daily"]["granularity"], "day");
        assert!(json["statistics"].is_null());
    }
}
