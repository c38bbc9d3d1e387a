use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

use super::common::{map_service_error, success_response};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    handlers::AppState,
    reports::breakdown::BreakdownGranularity,
    reports::filter::{
        ActivityFilter, DateRange, DeliveryStatus, OrderStatus, RecordKind, ReportFilter, SortKey,
        SortOrder, StatusFilter,
    },
};

// Request DTOs

/// Query parameters shared by the list and detail report endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Period start, "YYYY-MM-DD" (inclusive; requires end_date)
    pub start_date: Option<String>,
    /// Period end, "YYYY-MM-DD" (inclusive; requires start_date)
    pub end_date: Option<String>,
    /// Restrict the executive report to one principal
    pub executive_id: Option<Uuid>,
    /// Restrict the roster to one department
    pub department: Option<String>,
    /// Comma-separated role ids; defaults to the standard report roles
    pub role_ids: Option<String>,
    /// Explicit warehouse filter, reconciled against the requester's scope
    pub godown_id: Option<Uuid>,
    /// "order" (default) or "visit"
    pub record_kind: Option<RecordKind>,
    /// "all" (default), "active" or "inactive"
    pub activity: Option<ActivityFilter>,
    /// Explicit lifecycle status; overrides the default exclusions
    pub status: Option<OrderStatus>,
    /// Explicit delivery status; overrides the default exclusions
    pub delivery_status: Option<DeliveryStatus>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ReportQuery {
    /// Builds the validated filter descriptor consumed by the services.
    pub fn to_filter(&self) -> Result<ReportFilter, ApiError> {
        let date_range = match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => {
                let start = parse_date(start, "start date")?;
                let end = parse_date(end, "end date")?;
                Some(DateRange::from_calendar_days(start, end).map_err(ApiError::ServiceError)?)
            }
            (None, None) => None,
            _ => {
                return Err(ApiError::BadRequest(
                    "start_date and end_date must be provided together".into(),
                ))
            }
        };

        let role_ids = self
            .role_ids
            .as_deref()
            .map(parse_uuid_list)
            .transpose()?
            .filter(|ids| !ids.is_empty());

        Ok(ReportFilter {
            date_range,
            executive_id: self.executive_id,
            department: self.department.clone(),
            role_ids,
            godown_id: self.godown_id,
            record_kind: self.record_kind.unwrap_or_default(),
            activity: self.activity.unwrap_or_default(),
            status: StatusFilter::from_inputs(self.status, self.delivery_status),
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
            page: self.page,
            limit: self.limit,
        })
    }
}

fn parse_date(value: &str, label: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| ApiError::BadRequest(format!("Invalid {label} format: {e}")))
}

fn parse_uuid_list(value: &str) -> Result<Vec<Uuid>, ApiError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|e| ApiError::BadRequest(format!("Invalid role id: {e}")))
        })
        .collect()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BreakdownQuery {
    /// "date" (default) or "month"
    pub granularity: Option<BreakdownGranularity>,
}

// Handler functions

/// Executive performance report
#[utoipa::path(
    get,
    path = "/api/v1/reports/executives",
    summary = "Executive performance report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report generated", body = crate::services::executive_reports::ExecutiveReport),
        (status = 400, description = "Invalid request parameters", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    )
)]
pub async fn executive_performance_report(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(requester): AuthenticatedUser,
    Query(params): Query<ReportQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = params.to_filter()?;
    let report = state
        .services
        .executive_reports
        .executive_performance(&requester, &filter)
        .await
        .map_err(map_service_error)?;

    info!(
        groups = report.pagination.total_items,
        "Generated executive performance report"
    );

    Ok(success_response(report))
}

/// Single-executive detail report
#[utoipa::path(
    get,
    path = "/api/v1/reports/executives/{executive_id}",
    summary = "Executive detail report",
    params(
        ("executive_id" = Uuid, Path, description = "Executive principal id"),
        ReportQuery,
    ),
    responses(
        (status = 200, description = "Report generated", body = crate::services::executive_reports::ExecutiveDetail),
        (status = 404, description = "Executive not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn executive_detail_report(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(requester): AuthenticatedUser,
    Path(executive_id): Path<Uuid>,
    Query(params): Query<ReportQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = params.to_filter()?;
    let report = state
        .services
        .executive_reports
        .executive_detail(&requester, executive_id, &filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

/// Per-godown revenue report
#[utoipa::path(
    get,
    path = "/api/v1/reports/godowns",
    summary = "Godown revenue report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report generated", body = crate::services::godown_reports::GodownReport),
        (status = 400, description = "Invalid request parameters", body = crate::errors::ErrorResponse),
    )
)]
pub async fn godown_revenue_report(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(requester): AuthenticatedUser,
    Query(params): Query<ReportQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = params.to_filter()?;
    let report = state
        .services
        .godown_reports
        .godown_revenue(&requester, &filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

/// Customer purchase report (doubles as the inactivity report via
/// `activity=inactive`)
#[utoipa::path(
    get,
    path = "/api/v1/reports/customers",
    summary = "Customer purchase report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Report generated", body = crate::services::customer_reports::CustomerReport),
        (status = 400, description = "Invalid request parameters", body = crate::errors::ErrorResponse),
    )
)]
pub async fn customer_purchase_report(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(requester): AuthenticatedUser,
    Query(params): Query<ReportQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = params.to_filter()?;
    let report = state
        .services
        .customer_reports
        .customer_purchases(&requester, &filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

/// Single-customer detail report
#[utoipa::path(
    get,
    path = "/api/v1/reports/customers/{customer_id}",
    summary = "Customer detail report",
    params(
        ("customer_id" = Uuid, Path, description = "Customer id"),
        ReportQuery,
    ),
    responses(
        (status = 200, description = "Report generated", body = crate::services::customer_reports::CustomerDetail),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn customer_detail_report(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(requester): AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
    Query(params): Query<ReportQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = params.to_filter()?;
    let report = state
        .services
        .customer_reports
        .customer_detail(&requester, customer_id, &filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(report))
}

/// Date-wise / month-wise order breakdown for export consumers
#[utoipa::path(
    get,
    path = "/api/v1/reports/orders/breakdown",
    summary = "Order breakdown by calendar period",
    params(BreakdownQuery, ReportQuery),
    responses(
        (status = 200, description = "Breakdown generated", body = Vec<crate::reports::breakdown::PeriodBucket>),
        (status = 400, description = "Invalid request parameters", body = crate::errors::ErrorResponse),
    )
)]
pub async fn order_breakdown_report(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(requester): AuthenticatedUser,
    Query(breakdown): Query<BreakdownQuery>,
    Query(params): Query<ReportQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let filter = params.to_filter()?;
    let granularity = breakdown.granularity.unwrap_or_default();
    let buckets = state
        .services
        .godown_reports
        .order_breakdown(&requester, &filter, granularity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(buckets))
}

/// Creates the router for report endpoints
pub fn report_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/executives", get(executive_performance_report))
        .route("/executives/:executive_id", get(executive_detail_report))
        .route("/godowns", get(godown_revenue_report))
        .route("/customers", get(customer_purchase_report))
        .route("/customers/:customer_id", get(customer_detail_report))
        .route("/orders/breakdown", get(order_breakdown_report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_match_contract() {
        let filter = ReportQuery::default().to_filter().unwrap();
        assert_eq!(filter.record_kind, RecordKind::Order);
        assert_eq!(filter.activity, ActivityFilter::All);
        assert_eq!(filter.status, StatusFilter::DefaultExclusions);
        assert_eq!(filter.sort_by, SortKey::Revenue);
        assert_eq!(filter.sort_order, SortOrder::Desc);
        assert!(filter.date_range.is_none());
    }

    #[test]
    fn lone_date_bound_is_rejected() {
        let query = ReportQuery {
            start_date: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(query.to_filter().is_err());
    }

    #[test]
    fn role_id_list_parses_from_csv() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let query = ReportQuery {
            role_ids: Some(format!("{a}, {b}")),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.role_ids, Some(vec![a, b]));
    }

    #[test]
    fn malformed_role_id_is_a_caller_error() {
        let query = ReportQuery {
            role_ids: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert!(query.to_filter().is_err());
    }
}
