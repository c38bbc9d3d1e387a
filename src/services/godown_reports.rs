use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::entities::{godown, sales_order, user};
use crate::errors::ServiceError;
use crate::reports::aggregate::{aggregate_godowns, sort_godown_rows, GodownRow};
use crate::reports::breakdown::{date_wise, month_wise, BreakdownGranularity, PeriodBucket};
use crate::reports::filter::{ActivityFilter, DateRange, ReportFilter};
use crate::reports::scope::{resolve_scope, GodownScope};
use crate::reports::summary::{
    paginate, summarize_godowns, PageRequest, Pagination, ReportSummary,
};

use super::{accessible_godowns, fetch_orders_in_range, wrap_computation};

/// Per-warehouse revenue list report.
#[derive(Debug, Serialize, ToSchema)]
pub struct GodownReport {
    pub summary: ReportSummary,
    pub reports: Vec<GodownRow>,
    pub date_range: Option<DateRange>,
    pub pagination: Pagination,
}

impl GodownReport {
    fn denied(filter: &ReportFilter) -> Self {
        let (reports, pagination) = paginate(
            Vec::<GodownRow>::new(),
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

/// Report service for warehouse revenue reports
#[derive(Clone)]
pub struct GodownReportService {
    db: Arc<DatabaseConnection>,
}

impl GodownReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Generates the per-godown revenue report. The godown roster and the
    /// order scan are independent fetches and run concurrently; scope
    /// resolution precedes both.
    #[instrument(skip(self, requester, filter), fields(requester_id = %requester.id))]
    pub async fn godown_revenue(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
    ) -> Result<GodownReport, ServiceError> {
        self.godown_revenue_inner(requester, filter)
            .await
            .map_err(|e| wrap_computation("godown revenue", e))
    }

    async fn godown_revenue_inner(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
    ) -> Result<GodownReport, ServiceError> {
        filter.validate()?;
        let db = &*self.db;

        let accessible = accessible_godowns(db, requester.id).await?;
        let scope = resolve_scope(requester, &accessible, filter.godown_id);
        if scope.is_denied() {
            info!("Warehouse filter outside requester scope; returning zeroed report");
            return Ok(GodownReport::denied(filter));
        }

        let (roster, orders) = tokio::try_join!(
            fetch_godown_roster(db, &scope),
            fetch_orders_in_range(db, filter.date_range),
        )?;

        let orders: Vec<sales_order::Model> = orders
            .into_iter()
            .filter(|o| scope.allows(o.godown_id) && filter.status.admits_order(o))
            .collect();

        let mut rows = aggregate_godowns(&orders, &roster, Utc::now());

        match filter.activity {
            ActivityFilter::All => {}
            ActivityFilter::Active => rows.retain(|r| r.metrics.total_records > 0),
            ActivityFilter::Inactive => rows.retain(|r| r.metrics.total_records == 0),
        }

        let summary = summarize_godowns(&rows);
        sort_godown_rows(&mut rows, filter.sort_by, filter.sort_order);
        let (reports, pagination) = paginate(rows, PageRequest::clamped(filter.page, filter.limit));

        info!(
            godowns = pagination.total_items,
            revenue = %summary.total_revenue,
            "Generated godown revenue report"
        );

        Ok(GodownReport {
            summary,
            reports,
            date_range: filter.date_range,
            pagination,
        })
    }

    /// Date-wise or month-wise totals over the scoped order set, for the
    /// spreadsheet-export adapter. Reads the same filtered records as
    /// [`Self::godown_revenue`], so per-period totals reconcile with the
    /// list report's summary.
    #[instrument(skip(self, requester, filter), fields(requester_id = %requester.id))]
    pub async fn order_breakdown(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
        granularity: BreakdownGranularity,
    ) -> Result<Vec<PeriodBucket>, ServiceError> {
        self.order_breakdown_inner(requester, filter, granularity)
            .await
            .map_err(|e| wrap_computation("order breakdown", e))
    }

    async fn order_breakdown_inner(
        &self,
        requester: &user::Model,
        filter: &ReportFilter,
        granularity: BreakdownGranularity,
    ) -> Result<Vec<PeriodBucket>, ServiceError> {
        filter.validate()?;
        let db = &*self.db;

        let accessible = accessible_godowns(db, requester.id).await?;
        let scope = resolve_scope(requester, &accessible, filter.godown_id);
        if scope.is_denied() {
            return Ok(Vec::new());
        }

        let orders = fetch_orders_in_range(db, filter.date_range).await?;
        let orders: Vec<sales_order::Model> = orders
            .into_iter()
            .filter(|o| scope.allows(o.godown_id) && filter.status.admits_order(o))
            .collect();

        let buckets = match granularity {
            BreakdownGranularity::Date => date_wise(&orders),
            BreakdownGranularity::Month => month_wise(&orders),
        };
        Ok(buckets)
    }
}

/// The godowns a report may group over: the whole table for unrestricted
/// requesters, otherwise exactly the allowed set.
async fn fetch_godown_roster(
    db: &DatabaseConnection,
    scope: &GodownScope,
) -> Result<Vec<godown::Model>, ServiceError> {
    let query = godown::Entity::find();
    let roster = match scope {
        GodownScope::Unrestricted => query.all(db).await?,
        GodownScope::Restricted(allowed) => {
            query
                .filter(godown::Column::Id.is_in(allowed.iter().copied().collect::<Vec<_>>()))
                .all(db)
                .await?
        }
        GodownScope::Denied => Vec::new(),
    };
    Ok(roster)
}
