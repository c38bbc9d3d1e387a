//! Summary statistics and page slicing.
//!
//! Hard ordering invariant: summaries are computed over the complete grouped
//! result set, then the set is sorted, then one page is sliced. Summary
//! numbers never depend on `page`/`limit`.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::reports::aggregate::{CustomerRow, ExecutiveGroup, GodownRow};

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Clamped pagination request: `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn clamped(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

/// Pagination block echoed back alongside a page of rows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Sorts nothing and filters nothing: takes the already-sorted complete set
/// and returns the requested slice plus the pagination block.
pub fn paginate<T>(rows: Vec<T>, request: PageRequest) -> (Vec<T>, Pagination) {
    let total_items = rows.len() as u64;
    let total_pages = total_items.div_ceil(request.limit);
    let start = request
        .page
        .saturating_sub(1)
        .saturating_mul(request.limit) as usize;

    let page_rows: Vec<T> = rows
        .into_iter()
        .skip(start)
        .take(request.limit as usize)
        .collect();

    (
        page_rows,
        Pagination {
            page: request.page,
            limit: request.limit,
            total_items,
            total_pages,
        },
    )
}

/// Summary block of the executive and godown list reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ReportSummary {
    pub total_groups: i64,
    pub total_records: i64,
    pub total_revenue: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub avg_order_value: Decimal,
}

/// Summary block of the customer list report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct CustomerSummary {
    pub total_customers: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub total_quantity_kg: Decimal,
    pub avg_order_value: Decimal,
}

fn safe_avg(revenue: Decimal, count: i64) -> Decimal {
    if count > 0 {
        revenue / Decimal::from(count)
    } else {
        Decimal::ZERO
    }
}

/// Summarizes the complete executive group list, synthetic groups included,
/// so that the summary total always equals the sum of the visible rows.
pub fn summarize_executives(groups: &[ExecutiveGroup]) -> ReportSummary {
    let mut summary = ReportSummary {
        total_groups: groups.len() as i64,
        ..Default::default()
    };
    for group in groups {
        let m = group.metrics();
        summary.total_records += m.total_records;
        summary.total_revenue += m.total_revenue;
        summary.total_paid += m.total_paid;
        summary.total_outstanding += m.total_outstanding;
    }
    summary.avg_order_value = safe_avg(summary.total_revenue, summary.total_records);
    summary
}

pub fn summarize_godowns(rows: &[GodownRow]) -> ReportSummary {
    let mut summary = ReportSummary {
        total_groups: rows.len() as i64,
        ..Default::default()
    };
    for row in rows {
        summary.total_records += row.metrics.total_records;
        summary.total_revenue += row.metrics.total_revenue;
        summary.total_paid += row.metrics.total_paid;
        summary.total_outstanding += row.metrics.total_outstanding;
    }
    summary.avg_order_value = safe_avg(summary.total_revenue, summary.total_records);
    summary
}

pub fn summarize_customers(rows: &[CustomerRow]) -> CustomerSummary {
    let mut summary = CustomerSummary {
        total_customers: rows.len() as i64,
        ..Default::default()
    };
    for row in rows {
        summary.total_orders += row.total_orders;
        summary.total_revenue += row.total_revenue;
        summary.total_paid += row.total_paid;
        summary.total_outstanding += row.total_outstanding;
        summary.total_quantity_kg += row.total_quantity_kg;
    }
    summary.avg_order_value = safe_avg(summary.total_revenue, summary.total_orders);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_limit_are_clamped() {
        assert_eq!(
            PageRequest::clamped(None, None),
            PageRequest { page: 1, limit: DEFAULT_PAGE_LIMIT }
        );
        assert_eq!(
            PageRequest::clamped(Some(0), Some(0)),
            PageRequest { page: 1, limit: 1 }
        );
        assert_eq!(
            PageRequest::clamped(Some(3), Some(500)),
            PageRequest { page: 3, limit: MAX_PAGE_LIMIT }
        );
    }

    #[test]
    fn pagination_slices_without_touching_totals() {
        let rows: Vec<i32> = (1..=25).collect();
        let (page, info) = paginate(rows, PageRequest { page: 3, limit: 10 });

        assert_eq!(page, vec![21, 22, 23, 24, 25]);
        assert_eq!(info.total_items, 25);
        assert_eq!(info.total_pages, 3);
    }

    #[test]
    fn page_past_the_end_is_empty_but_totals_hold() {
        let rows: Vec<i32> = (1..=4).collect();
        let (page, info) = paginate(rows, PageRequest { page: 9, limit: 10 });
        assert!(page.is_empty());
        assert_eq!(info.total_items, 4);
        assert_eq!(info.total_pages, 1);
    }

    #[test]
    fn empty_summaries_are_all_zero() {
        let summary = summarize_executives(&[]);
        assert_eq!(summary, ReportSummary::default());
        let summary = summarize_customers(&[]);
        assert_eq!(summary, CustomerSummary::default());
    }
}
