use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers::reports as report_handlers;
use crate::reports::aggregate::{
    CustomerRow, ExecutiveGroup, ExecutiveRow, GodownRow, GroupMetrics, OrphanRow,
};
use crate::reports::breakdown::{PeriodBucket, TrendPoint};
use crate::reports::filter::{
    ActivityFilter, DateRange, DeliveryStatus, OrderStatus, RecordKind, SortKey, SortOrder,
};
use crate::reports::summary::{CustomerSummary, Pagination, ReportSummary};
use crate::services::customer_reports::{
    CustomerDetail, CustomerProfile, CustomerReport, GradeBreakdown, PurchaseMetrics,
};
use crate::services::executive_reports::{
    ExecutiveDetail, ExecutiveProfile, ExecutiveReport, RecentOrder, TopCustomer,
};
use crate::services::godown_reports::GodownReport;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SalesOps API",
        description = "Sales and operations analytics for a multi-godown distribution business: \
executive performance, godown revenue, customer purchase history, inactivity detection \
and calendar breakdowns for export consumers."
    ),
    paths(
        report_handlers::executive_performance_report,
        report_handlers::executive_detail_report,
        report_handlers::godown_revenue_report,
        report_handlers::customer_purchase_report,
        report_handlers::customer_detail_report,
        report_handlers::order_breakdown_report,
    ),
    components(schemas(
        ErrorResponse,
        DateRange,
        RecordKind,
        ActivityFilter,
        OrderStatus,
        DeliveryStatus,
        SortKey,
        SortOrder,
        GroupMetrics,
        ExecutiveGroup,
        ExecutiveRow,
        OrphanRow,
        GodownRow,
        CustomerRow,
        ReportSummary,
        CustomerSummary,
        Pagination,
        PeriodBucket,
        TrendPoint,
        ExecutiveReport,
        ExecutiveDetail,
        ExecutiveProfile,
        TopCustomer,
        RecentOrder,
        GodownReport,
        CustomerReport,
        CustomerDetail,
        CustomerProfile,
        PurchaseMetrics,
        GradeBreakdown,
    )),
    tags(
        (name = "reports", description = "Role-scoped analytics reports")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the generated document
/// from `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
