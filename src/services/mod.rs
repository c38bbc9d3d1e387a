// Report services
pub mod customer_reports;
pub mod executive_reports;
pub mod godown_reports;

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{
    order_item, role, sales_order, user, user_godown_access, visit,
};
use crate::errors::ServiceError;
use crate::reports::filter::{DateRange, ReportFilter, DEFAULT_REPORT_ROLES};

/// Wraps unexpected aggregation failures with the report being generated.
/// Caller-input and not-found conditions pass through untouched.
pub(crate) fn wrap_computation(report: &str, err: ServiceError) -> ServiceError {
    match err {
        e @ (ServiceError::NotFound(_)
        | ServiceError::ValidationError(_)
        | ServiceError::InvalidInput(_)
        | ServiceError::Forbidden(_)) => e,
        other => ServiceError::report_failed(report, other),
    }
}

/// Godowns the user may see beyond their primary assignment.
pub(crate) async fn accessible_godowns(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<Uuid>, ServiceError> {
    let rows = user_godown_access::Entity::find()
        .filter(user_godown_access::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.godown_id).collect())
}

/// Orders inside the (optional) reporting period. Scope and status admission
/// are applied in memory by the caller so that every report path goes through
/// the same resolver and the same precedence rule.
pub(crate) async fn fetch_orders_in_range(
    db: &DatabaseConnection,
    range: Option<DateRange>,
) -> Result<Vec<sales_order::Model>, ServiceError> {
    let mut query = sales_order::Entity::find();
    if let Some(range) = range {
        query = query
            .filter(sales_order::Column::OrderDate.gte(range.start))
            .filter(sales_order::Column::OrderDate.lte(range.end));
    }
    Ok(query.all(db).await?)
}

/// Visits inside the (optional) reporting period.
pub(crate) async fn fetch_visits_in_range(
    db: &DatabaseConnection,
    range: Option<DateRange>,
) -> Result<Vec<visit::Model>, ServiceError> {
    let mut query = visit::Entity::find();
    if let Some(range) = range {
        query = query
            .filter(visit::Column::VisitDate.gte(range.start))
            .filter(visit::Column::VisitDate.lte(range.end));
    }
    Ok(query.all(db).await?)
}

pub(crate) async fn fetch_users(
    db: &DatabaseConnection,
) -> Result<Vec<user::Model>, ServiceError> {
    Ok(user::Entity::find().all(db).await?)
}

pub(crate) async fn fetch_roles(
    db: &DatabaseConnection,
) -> Result<Vec<role::Model>, ServiceError> {
    Ok(role::Entity::find().all(db).await?)
}

/// Line items for the given orders, grouped by order id.
pub(crate) async fn fetch_items_by_order(
    db: &DatabaseConnection,
    order_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<order_item::Model>>, ServiceError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .all(db)
        .await?;

    let mut by_order: HashMap<Uuid, Vec<order_item::Model>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    Ok(by_order)
}

/// Resolves the role-id set the executive report scans: the caller's explicit
/// set, or the ids of the default report roles. Unknown default role names
/// resolve to nothing rather than erroring.
pub(crate) fn resolve_role_ids(filter: &ReportFilter, roles: &[role::Model]) -> Vec<Uuid> {
    if let Some(ids) = &filter.role_ids {
        return ids.clone();
    }
    roles
        .iter()
        .filter(|r| {
            DEFAULT_REPORT_ROLES
                .iter()
                .any(|name| r.name.eq_ignore_ascii_case(name))
        })
        .map(|r| r.id)
        .collect()
}
