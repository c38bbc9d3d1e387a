//! Date-wise and month-wise record breakdowns.
//!
//! The spreadsheet-export adapter consumes these next to the list reports;
//! both read the same filtered record set, so per-period totals always
//! reconcile with the report summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::sales_order;

/// Calendar resolution of a breakdown.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, Serialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownGranularity {
    #[default]
    Date,
    Month,
}

/// Totals for one calendar day or month.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodBucket {
    /// "2024-06-03" for date-wise rows, "2024-06" for month-wise rows.
    pub period: String,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
}

fn bucket_by_format(orders: &[sales_order::Model], format: &str) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<String, PeriodBucket> = BTreeMap::new();

    for order in orders {
        let key = order.order_date.format(format).to_string();
        let entry = buckets.entry(key.clone()).or_insert_with(|| PeriodBucket {
            period: key,
            total_orders: 0,
            total_revenue: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_outstanding: Decimal::ZERO,
        });
        entry.total_orders += 1;
        entry.total_revenue += order.total_amount;
        entry.total_paid += order.paid_amount;
        entry.total_outstanding += order.total_amount - order.paid_amount;
    }

    buckets.into_values().collect()
}

/// Per-calendar-day totals, ascending by date.
pub fn date_wise(orders: &[sales_order::Model]) -> Vec<PeriodBucket> {
    bucket_by_format(orders, "%Y-%m-%d")
}

/// Per-calendar-month totals, ascending by month.
pub fn month_wise(orders: &[sales_order::Model]) -> Vec<PeriodBucket> {
    bucket_by_format(orders, "%Y-%m")
}

/// One point of a detail report's trend line.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrendPoint {
    /// "2024-06".
    pub month: String,
    pub total_orders: i64,
    pub total_revenue: Decimal,
}

/// Trend over the last `months_back` calendar months ending at `now`,
/// zero-filled so charting consumers get a contiguous axis.
pub fn monthly_trend(
    orders: &[sales_order::Model],
    now: DateTime<Utc>,
    months_back: u32,
) -> Vec<TrendPoint> {
    let mut by_month: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
    for order in orders {
        let key = order.order_date.format("%Y-%m").to_string();
        let entry = by_month.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += order.total_amount;
    }

    let current = now
        .date_naive()
        .with_day(1)
        .unwrap_or_else(|| now.date_naive());

    (0..months_back)
        .rev()
        .filter_map(|offset| current.checked_sub_months(Months::new(offset)))
        .map(|month_start| {
            let key = month_start.format("%Y-%m").to_string();
            let (orders, revenue) = by_month.get(&key).copied().unwrap_or((0, Decimal::ZERO));
            TrendPoint {
                month: key,
                total_orders: orders,
                total_revenue: revenue,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order_on(year: i32, month: u32, day: u32, total: Decimal) -> sales_order::Model {
        sales_order::Model {
            id: Uuid::new_v4(),
            order_number: "ORD".into(),
            customer_id: Uuid::new_v4(),
            created_by: None,
            godown_id: None,
            status: "completed".into(),
            payment_status: "paid".into(),
            delivery_status: "delivered".into(),
            subtotal: total,
            discount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_amount: total,
            paid_amount: total,
            order_date: Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn date_wise_groups_and_orders_ascending() {
        let orders = vec![
            order_on(2024, 6, 3, dec!(100)),
            order_on(2024, 6, 1, dec!(40)),
            order_on(2024, 6, 3, dec!(60)),
        ];
        let buckets = date_wise(&orders);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period, "2024-06-01");
        assert_eq!(buckets[0].total_revenue, dec!(40));
        assert_eq!(buckets[1].period, "2024-06-03");
        assert_eq!(buckets[1].total_orders, 2);
        assert_eq!(buckets[1].total_revenue, dec!(160));
    }

    #[test]
    fn month_wise_reconciles_with_date_wise() {
        let orders = vec![
            order_on(2024, 5, 30, dec!(100)),
            order_on(2024, 6, 1, dec!(50)),
            order_on(2024, 6, 20, dec!(25)),
        ];
        let monthly = month_wise(&orders);
        let daily = date_wise(&orders);

        let monthly_total: Decimal = monthly.iter().map(|b| b.total_revenue).sum();
        let daily_total: Decimal = daily.iter().map(|b| b.total_revenue).sum();
        assert_eq!(monthly_total, daily_total);
        assert_eq!(monthly[1].period, "2024-06");
        assert_eq!(monthly[1].total_revenue, dec!(75));
    }

    #[test]
    fn monthly_trend_zero_fills_quiet_months() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let orders = vec![order_on(2024, 4, 10, dec!(100))];
        let trend = monthly_trend(&orders, now, 3);

        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].month, "2024-04");
        assert_eq!(trend[0].total_revenue, dec!(100));
        assert_eq!(trend[1].month, "2024-05");
        assert_eq!(trend[1].total_orders, 0);
        assert_eq!(trend[2].month, "2024-06");
    }
}
