use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{customer, sales_order, user};
use crate::errors::ServiceError;
use crate::reports::aggregate::{
    aggregate_customers, order_contributes_totals, sort_customer_rows, CustomerRow,
};
use crate::reports::breakdown::{monthly_trend, TrendPoint};
use crate::reports::filter::{ActivityFilter, DateRange, ReportFilter};
use crate::reports::scope::resolve_scope;
use crate::reports::summary::{
    paginate, summarize_customers, CustomerSummary, PageRequest, Pagination,
};
use crate::reports::units::normalize_to_kg;

use super::executive_reports::RecentOrder;
use super::{
    accessible_godowns, fetch_items_by_order, fetch_orders_in_range, wrap_computation,
};

const TREND_MONTHS: u32 = 12;
const RECENT_ORDER_COUNT: usize = 10;

/// Fallback grade label for ungraded line items.
const UNGRADED_LABEL: &str = "Ungraded";

/// Customer purchase list report.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerReport {
    pub summary: CustomerSummary,
    pub reports: Vec<CustomerRow>,
    pub date_range: Option<DateRange>,
    pub pagination: Pagination,
}

impl CustomerReport {
    fn denied(filter: &ReportFilter) -> Self {
        let (reports, pagination) = paginate(
            Vec::<CustomerRow>::new(),
            PageRequest::clamped(filter.page, filter.limit),
        );
        Self {
            summary: CustomerSummary::default(),
            reports,
            date_range: filter.date_range,
            pagination,
        }
    }
}

/// Identity block of a customer detail report.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerProfile {
    pub id: Uuid,
    pub business_name: String,
    pub customer_type: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub credit_limit: Decimal,
    pub outstanding_amount: Decimal,
    pub assigned_godown_id: Option<Uuid>,
}

impl From<&customer::Model> for CustomerProfile {
    fn from(c: &customer::Model) -> Self {
        Self {
            id: c.id,
            business_name: c.business_name.clone(),
            customer_type: c.customer_type.clone(),
            city: c.city.clone(),
            state: c.state.clone(),
            credit_limit: c.credit_limit,
            outstanding_amount: c.outstanding_amount,
            assigned_godown_id: c.assigned_godown_id,
        }
    }
}

/// Purchase aggregates of one customer over the filtered period.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct PurchaseMetrics {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub total_quantity_kg: Decimal,
    pub avg_order_value: Decimal,
    pub first_order_date: Option<DateTime<Utc>>,
    pub last_order_date: Option<DateTime<Utc>>,
    pub days_since_last_order: Option<i64>,
}

impl From<CustomerRow> for PurchaseMetrics {
    fn from(row: CustomerRow) -> Self {
        Self {
            total_orders: row.total_orders,
            total_revenue: row.total_revenue,
            total_paid: row.total_paid,
            total_outstanding: row.total_outstanding,
            total_quantity_kg: row.total_quantity_kg,
            avg_order_value: row.avg_order_value,
            first_order_date: row.first_order_date,
            last_order_date: row.last_order_date,
            days_since_last_order: row.days_since_last_order,
        }
    }
}

/// Kilograms and revenue for one product grade.
#[derive(Debug, Serialize, ToSchema)]
pub struct GradeBreakdown {
    pub grade: String,
    pub total_quantity_kg: Decimal,
    pub total_revenue: Decimal,
}

/// Single-customer expansion: identity, aggregates, grade split, trend.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDetail {
    pub customer: CustomerProfile,
    pub metrics: PurchaseMetrics,
    pub grade_breakdown: Vec<GradeBreakdown>,
    pub monthly_trend: Vec<TrendPoint>,
    pub recent_orders: Vec<RecentOrder>,
}

/// Report service for customer purchase history and inactivity reports
#[derive(Clone)]
pub struct CustomerReportService {
    db: Arc<DatabaseConnection>,
}

impl CustomerReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Generates the customer purchase report. Customers are scoped by their
    /// assigned godown; cancelled/rejected/returned orders stay visible in
    /// order counts but contribute zero money and zero kilograms. With
    /// `ActivityFilter::Inactive` this doubles as the inactivity report.
    #[instrument(skip(self, requester, filter), fields(requester_id = %requester.id))]
    pub async fn customer_purchases(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
    ) -> Result<CustomerReport, ServiceError> {
        self.customer_purchases_inner(requester, filter)
            .await
            .map_err(|e| wrap_computation("customer purchases", e))
    }

    async fn customer_purchases_inner(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
    ) -> Result<CustomerReport, ServiceError> {
        filter.validate()?;
        let db = &*self.db;

        let accessible = accessible_godowns(db, requester.id).await?;
        let scope = resolve_scope(requester, &accessible, filter.godown_id);
        if scope.is_denied() {
            info!("Warehouse filter outside requester scope; returning zeroed report");
            return Ok(CustomerReport::denied(filter));
        }

        let (customers, orders) = tokio::try_join!(
            fetch_customers(db),
            fetch_orders_in_range(db, filter.date_range),
        )?;

        let customers: Vec<customer::Model> = customers
            .into_iter()
            .filter(|c| scope.allows(c.assigned_godown_id))
            .collect();

        // An explicit status filter narrows the scan; the default keeps
        // cancelled orders visible and lets the aggregator zero them.
        let orders: Vec<sales_order::Model> = orders
            .into_iter()
            .filter(|o| !filter.status.is_explicit() || filter.status.admits_order(o))
            .collect();

        let roster_ids: std::collections::HashSet<Uuid> =
            customers.iter().map(|c| c.id).collect();
        let contributing_ids: Vec<Uuid> = orders
            .iter()
            .filter(|o| roster_ids.contains(&o.customer_id) && order_contributes_totals(o))
            .map(|o| o.id)
            .collect();
        let items_by_order = fetch_items_by_order(db, contributing_ids).await?;

        let mut rows = aggregate_customers(&orders, &items_by_order, &customers, Utc::now());

        match filter.activity {
            ActivityFilter::All => {}
            ActivityFilter::Active => rows.retain(|r| r.total_orders > 0),
            ActivityFilter::Inactive => rows.retain(|r| r.total_orders == 0),
        }

        let summary = summarize_customers(&rows);
        sort_customer_rows(&mut rows, filter.sort_by, filter.sort_order);
        let (reports, pagination) = paginate(rows, PageRequest::clamped(filter.page, filter.limit));

        info!(
            customers = pagination.total_items,
            revenue = %summary.total_revenue,
            quantity_kg = %summary.total_quantity_kg,
            "Generated customer purchase report"
        );

        Ok(CustomerReport {
            summary,
            reports,
            date_range: filter.date_range,
            pagination,
        })
    }

    /// Expands one customer's purchase history. Unknown ids raise not-found;
    /// a customer assigned outside the requester's scope is reported
    /// not-found as well, so probing cannot reveal other warehouses' books.
    #[instrument(skip(self, requester, filter), fields(customer_id = %customer_id))]
    pub async fn customer_detail(
        &self,
        requester: &user::Model,
        customer_id: Uuid,
        filter: &ReportFilter,
    ) -> Result<CustomerDetail, ServiceError> {
        self.customer_detail_inner(requester, customer_id, filter)
            .await
            .map_err(|e| wrap_computation("customer detail", e))
    }

    async fn customer_detail_inner(
        &self,
        requester: &user::Model,
        customer_id: Uuid,
        filter: &ReportFilter,
    ) -> Result<CustomerDetail, ServiceError> {
        filter.validate()?;
        let db = &*self.db;

        let target = customer::Entity::find_by_id(customer_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {customer_id} not found")))?;

        let profile = CustomerProfile::from(&target);

        let accessible = accessible_godowns(db, requester.id).await?;
        let scope = resolve_scope(requester, &accessible, filter.godown_id);
        if scope.is_denied() {
            return Ok(CustomerDetail {
                customer: profile,
                metrics: PurchaseMetrics::default(),
                grade_breakdown: Vec::new(),
                monthly_trend: Vec::new(),
                recent_orders: Vec::new(),
            });
        }
        if !scope.allows(target.assigned_godown_id) {
            return Err(ServiceError::NotFound(format!(
                "Customer {customer_id} not found"
            )));
        }

        let orders = fetch_orders_in_range(db, filter.date_range).await?;
        let mut orders: Vec<sales_order::Model> = orders
            .into_iter()
            .filter(|o| o.customer_id == target.id)
            .filter(|o| !filter.status.is_explicit() || filter.status.admits_order(o))
            .collect();

        let contributing: Vec<sales_order::Model> = orders
            .iter()
            .filter(|o| order_contributes_totals(o))
            .cloned()
            .collect();
        let items_by_order =
            fetch_items_by_order(db, contributing.iter().map(|o| o.id).collect()).await?;

        let now = Utc::now();
        let metrics: PurchaseMetrics =
            aggregate_customers(&orders, &items_by_order, std::slice::from_ref(&target), now)
                .pop()
                .map(Into::into)
                .unwrap_or_default();

        let grade_breakdown = grade_breakdown(&contributing, &items_by_order);
        let trend_anchor = filter.date_range.map_or(now, |r| r.end);
        let trend = monthly_trend(&contributing, trend_anchor, TREND_MONTHS);

        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(a.id.cmp(&b.id)));
        let recent_orders = orders
            .iter()
            .take(RECENT_ORDER_COUNT)
            .map(RecentOrder::from)
            .collect();

        Ok(CustomerDetail {
            customer: profile,
            metrics,
            grade_breakdown,
            monthly_trend: trend,
            recent_orders,
        })
    }
}

async fn fetch_customers(db: &DatabaseConnection) -> Result<Vec<customer::Model>, ServiceError> {
    Ok(customer::Entity::find().all(db).await?)
}

/// Splits contributing line items by grade, normalizing quantities per item.
fn grade_breakdown(
    contributing: &[sales_order::Model],
    items_by_order: &HashMap<Uuid, Vec<crate::entities::order_item::Model>>,
) -> Vec<GradeBreakdown> {
    let mut by_grade: HashMap<String, (Decimal, Decimal)> = HashMap::new();
    for order in contributing {
        let Some(items) = items_by_order.get(&order.id) else {
            continue;
        };
        for item in items {
            let grade = item
                .grade
                .clone()
                .filter(|g| !g.trim().is_empty())
                .unwrap_or_else(|| UNGRADED_LABEL.to_string());
            let entry = by_grade.entry(grade).or_default();
            entry.0 += normalize_to_kg(item.quantity, &item.unit, item.packaging.as_deref());
            entry.1 += item.total_amount;
        }
    }

    let mut breakdown: Vec<GradeBreakdown> = by_grade
        .into_iter()
        .map(|(grade, (kg, revenue))| GradeBreakdown {
            grade,
            total_quantity_kg: kg,
            total_revenue: revenue,
        })
        .collect();
    breakdown.sort_by(|a, b| {
        b.total_quantity_kg
            .cmp(&a.total_quantity_kg)
            .then_with(|| a.grade.cmp(&b.grade))
    });
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order_item;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()
    }

    fn order(day: u32) -> sales_order::Model {
        sales_order::Model {
            id: Uuid::new_v4(),
            order_number: format!("ORD-{day}"),
            customer_id: Uuid::new_v4(),
            created_by: None,
            godown_id: None,
            status: "delivered".into(),
            payment_status: "paid".into(),
            delivery_status: "delivered".into(),
            subtotal: dec!(100),
            discount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_amount: dec!(100),
            paid_amount: dec!(100),
            order_date: ts(day),
            created_at: ts(day),
            updated_at: None,
        }
    }

    fn item(order_id: Uuid, grade: Option<&str>, qty: Decimal, unit: &str) -> order_item::Model {
        order_item::Model {
            id: Uuid::new_v4(),
            order_id,
            product_name: "Chakki Atta".into(),
            grade: grade.map(Into::into),
            quantity: qty,
            unit: unit.into(),
            rate_per_unit: dec!(30),
            total_amount: qty * dec!(30),
            packaging: Some("25kg Bags".into()),
        }
    }

    #[test]
    fn grade_breakdown_normalizes_and_buckets_ungraded() {
        let o1 = order(1);
        let o2 = order(2);
        let mut items = HashMap::new();
        items.insert(
            o1.id,
            vec![
                item(o1.id, Some("Premium"), dec!(4), "Bags"),
                item(o1.id, None, dec!(1), "Quintal"),
            ],
        );
        items.insert(o2.id, vec![item(o2.id, Some("Premium"), dec!(2), "Bags")]);

        let breakdown = grade_breakdown(&[o1, o2], &items);

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].grade, "Premium");
        assert_eq!(breakdown[0].total_quantity_kg, dec!(150));
        assert_eq!(breakdown[1].grade, "Ungraded");
        assert_eq!(breakdown[1].total_quantity_kg, dec!(100));
    }
}
