use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{customer, role, sales_order, user, visit};
use crate::errors::ServiceError;
use crate::reports::aggregate::{
    aggregate_executives, sort_executive_groups, ExecutiveGroup, GroupMetrics, RosterUser,
};
use crate::reports::breakdown::{monthly_trend, TrendPoint};
use crate::reports::filter::{ActivityFilter, DateRange, RecordKind, ReportFilter};
use crate::reports::scope::resolve_scope;
use crate::reports::summary::{
    paginate, summarize_executives, PageRequest, Pagination, ReportSummary,
};

use super::{
    accessible_godowns, fetch_orders_in_range, fetch_roles, fetch_users, fetch_visits_in_range,
    resolve_role_ids, wrap_computation,
};

/// Months of history in a detail report's trend line.
const TREND_MONTHS: u32 = 12;
const TOP_CUSTOMER_COUNT: usize = 5;
const RECENT_ORDER_COUNT: usize = 10;

/// Executive performance list report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutiveReport {
    pub summary: ReportSummary,
    pub reports: Vec<ExecutiveGroup>,
    pub date_range: Option<DateRange>,
    pub pagination: Pagination,
}

impl ExecutiveReport {
    /// The zeroed shape returned when the scope resolver denies an explicit
    /// warehouse filter.
    fn denied(filter: &ReportFilter) -> Self {
        let (reports, pagination) = paginate(
            Vec::<ExecutiveGroup>::new(),
            PageRequest::clamped(filter.page, filter.limit),
        );
        Self {
            summary: ReportSummary::default(),
            reports,
            date_range: filter.date_range,
            pagination,
        }
    }
}

/// Identity block of an executive detail report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutiveProfile {
    pub id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub email: String,
    pub department: Option<String>,
    pub role: Option<String>,
}

/// A counterparty ranked by revenue inside a detail report.
#[derive(Debug, Serialize, ToSchema)]
pub struct TopCustomer {
    pub customer_id: Uuid,
    pub business_name: Option<String>,
    pub total_orders: i64,
    pub total_revenue: Decimal,
}

/// A recent order row inside a detail report.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentOrder {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status: String,
    pub delivery_status: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

impl From<&sales_order::Model> for RecentOrder {
    fn from(order: &sales_order::Model) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            customer_id: order.customer_id,
            status: order.status.clone(),
            delivery_status: order.delivery_status.clone(),
            total_amount: order.total_amount,
            paid_amount: order.paid_amount,
            order_date: order.order_date,
        }
    }
}

/// Single-executive expansion: identity, aggregates, trend, counterparties.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExecutiveDetail {
    pub executive: ExecutiveProfile,
    pub metrics: GroupMetrics,
    pub monthly_trend: Vec<TrendPoint>,
    pub top_customers: Vec<TopCustomer>,
    pub recent_orders: Vec<RecentOrder>,
}

/// Report service for executive performance and detail reports
#[derive(Clone)]
pub struct ExecutiveReportService {
    db: Arc<DatabaseConnection>,
}

impl ExecutiveReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Generates the executive performance report: records grouped by
    /// creating principal, orphan records reconciled into synthetic groups,
    /// summary computed before pagination.
    #[instrument(skip(self, requester, filter), fields(requester_id = %requester.id))]
    pub async fn executive_performance(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
    ) -> Result<ExecutiveReport, ServiceError> {
        self.executive_performance_inner(requester, filter)
            .await
            .map_err(|e| wrap_computation("executive performance", e))
    }

    async fn executive_performance_inner(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
    ) -> Result<ExecutiveReport, ServiceError> {
        filter.validate()?;
        let db = &*self.db;

        let accessible = accessible_godowns(db, requester.id).await?;
        let scope = resolve_scope(requester, &accessible, filter.godown_id);
        if scope.is_denied() {
            info!("Warehouse filter outside requester scope; returning zeroed report");
            return Ok(ExecutiveReport::denied(filter));
        }

        let (users, roles, orders, visits) = tokio::try_join!(
            fetch_users(db),
            fetch_roles(db),
            fetch_records(db, filter, RecordKind::Order),
            fetch_visit_records(db, filter),
        )?;

        let orders: Vec<sales_order::Model> = orders
            .into_iter()
            .filter(|o| scope.allows(o.godown_id) && filter.status.admits_order(o))
            .collect();
        let visits: Vec<visit::Model> = visits
            .into_iter()
            .filter(|v| scope.allows(v.godown_id))
            .collect();

        let known_ids: HashSet<Uuid> = users.iter().map(|u| u.id).collect();
        let roster = build_roster(&users, &roles, filter);
        let single_principal = filter.executive_id.is_some();

        let mut groups = aggregate_executives(
            &orders,
            &visits,
            &roster,
            &known_ids,
            Utc::now(),
            single_principal,
        );

        match filter.activity {
            ActivityFilter::All => {}
            ActivityFilter::Active => groups.retain(|g| g.metrics().total_records > 0),
            ActivityFilter::Inactive => groups.retain(|g| g.metrics().total_records == 0),
        }

        // Summary over the complete grouped set; sorting and slicing after.
        let summary = summarize_executives(&groups);
        sort_executive_groups(&mut groups, filter.sort_by, filter.sort_order);
        let (reports, pagination) =
            paginate(groups, PageRequest::clamped(filter.page, filter.limit));

        info!(
            groups = pagination.total_items,
            revenue = %summary.total_revenue,
            "Generated executive performance report"
        );

        Ok(ExecutiveReport {
            summary,
            reports,
            date_range: filter.date_range,
            pagination,
        })
    }

    /// Expands one executive's history. Unknown ids raise not-found; an
    /// explicit warehouse filter outside the requester's scope zeroes the
    /// metrics without revealing anything else.
    #[instrument(skip(self, requester, filter), fields(executive_id = %executive_id))]
    pub async fn executive_detail(
        &self,
        requester: &user::Model,
        executive_id: Uuid,
        filter: &ReportFilter,
    ) -> Result<ExecutiveDetail, ServiceError> {
        self.executive_detail_inner(requester, executive_id, filter)
            .await
            .map_err(|e| wrap_computation("executive detail", e))
    }

    async fn executive_detail_inner(
        &self,
        requester: &user::Model,
        executive_id: Uuid,
        filter: &ReportFilter,
    ) -> Result<ExecutiveDetail, ServiceError> {
        filter.validate()?;
        let db = &*self.db;

        let target = user::Entity::find_by_id(executive_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Executive {executive_id} not found")))?;

        let role_name = match target.role_id {
            Some(role_id) => role::Entity::find_by_id(role_id)
                .one(db)
                .await?
                .map(|r| r.name),
            None => None,
        };

        let profile = ExecutiveProfile {
            id: target.id,
            name: target.name.clone(),
            employee_id: target.employee_id.clone(),
            email: target.email.clone(),
            department: target.department.clone(),
            role: role_name.clone(),
        };

        let accessible = accessible_godowns(db, requester.id).await?;
        let scope = resolve_scope(requester, &accessible, filter.godown_id);
        if scope.is_denied() {
            return Ok(ExecutiveDetail {
                executive: profile,
                metrics: GroupMetrics::default(),
                monthly_trend: Vec::new(),
                top_customers: Vec::new(),
                recent_orders: Vec::new(),
            });
        }

        let (orders, visits) = tokio::try_join!(
            fetch_orders_in_range(db, filter.date_range),
            fetch_visits_in_range(db, filter.date_range),
        )?;

        let mut orders: Vec<sales_order::Model> = orders
            .into_iter()
            .filter(|o| {
                o.created_by == Some(target.id)
                    && scope.allows(o.godown_id)
                    && filter.status.admits_order(o)
            })
            .collect();
        let visits: Vec<visit::Model> = visits
            .into_iter()
            .filter(|v| v.created_by == Some(target.id) && scope.allows(v.godown_id))
            .collect();

        let now = Utc::now();
        let roster = vec![RosterUser {
            user: target.clone(),
            role_name,
        }];
        let known_ids = HashSet::from([target.id]);
        let metrics = aggregate_executives(&orders, &visits, &roster, &known_ids, now, true)
            .into_iter()
            .next()
            .map(|g| g.metrics().clone())
            .unwrap_or_default();

        // Trend line trails the reporting period, not the wall clock.
        let trend_anchor = filter.date_range.map_or(now, |r| r.end);
        let trend = monthly_trend(&orders, trend_anchor, TREND_MONTHS);
        let top_customers = top_customers(db, &orders).await?;

        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(a.id.cmp(&b.id)));
        let recent_orders = orders
            .iter()
            .take(RECENT_ORDER_COUNT)
            .map(RecentOrder::from)
            .collect();

        Ok(ExecutiveDetail {
            executive: profile,
            metrics,
            monthly_trend: trend,
            top_customers,
            recent_orders,
        })
    }
}

/// Builds the principal roster the report groups over. An explicit principal
/// filter selects exactly that user (any role); otherwise active users in the
/// resolved role set, optionally narrowed by department.
fn build_roster(
    users: &[user::Model],
    roles: &[role::Model],
    filter: &ReportFilter,
) -> Vec<RosterUser> {
    let role_names: HashMap<Uuid, String> =
        roles.iter().map(|r| (r.id, r.name.clone())).collect();

    let to_roster = |u: &user::Model| RosterUser {
        user: u.clone(),
        role_name: u.role_id.and_then(|rid| role_names.get(&rid).cloned()),
    };

    if let Some(target) = filter.executive_id {
        return users.iter().filter(|u| u.id == target).map(to_roster).collect();
    }

    let role_ids: HashSet<Uuid> = resolve_role_ids(filter, roles).into_iter().collect();
    users
        .iter()
        .filter(|u| u.is_active)
        .filter(|u| u.role_id.is_some_and(|rid| role_ids.contains(&rid)))
        .filter(|u| {
            filter.department.as_deref().map_or(true, |wanted| {
                u.department
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(wanted))
            })
        })
        .map(to_roster)
        .collect()
}

async fn fetch_records(
    db: &DatabaseConnection,
    filter: &ReportFilter,
    kind: RecordKind,
) -> Result<Vec<sales_order::Model>, ServiceError> {
    if filter.record_kind == kind {
        fetch_orders_in_range(db, filter.date_range).await
    } else {
        Ok(Vec::new())
    }
}

async fn fetch_visit_records(
    db: &DatabaseConnection,
    filter: &ReportFilter,
) -> Result<Vec<visit::Model>, ServiceError> {
    if filter.record_kind == RecordKind::Visit {
        fetch_visits_in_range(db, filter.date_range).await
    } else {
        Ok(Vec::new())
    }
}

/// Ranks the detail set's counterparties by revenue and joins business names.
async fn top_customers(
    db: &DatabaseConnection,
    orders: &[sales_order::Model],
) -> Result<Vec<TopCustomer>, ServiceError> {
    let mut by_customer: HashMap<Uuid, (i64, Decimal)> = HashMap::new();
    for order in orders {
        let entry = by_customer.entry(order.customer_id).or_default();
        entry.0 += 1;
        entry.1 += order.total_amount;
    }

    let mut ranked: Vec<(Uuid, i64, Decimal)> = by_customer
        .into_iter()
        .map(|(id, (count, revenue))| (id, count, revenue))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    ranked.truncate(TOP_CUSTOMER_COUNT);

    if ranked.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = ranked.iter().map(|(id, _, _)| *id).collect();
    let names: HashMap<Uuid, String> = customer::Entity::find()
        .filter(customer::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.business_name))
        .collect();

    Ok(ranked
        .into_iter()
        .map(|(id, count, revenue)| TopCustomer {
            customer_id: id,
            business_name: names.get(&id).cloned(),
            total_orders: count,
            total_revenue: revenue,
        })
        .collect())
}
