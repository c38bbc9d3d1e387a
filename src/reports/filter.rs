//! Report filter descriptor.
//!
//! Handlers assemble a [`ReportFilter`] from optional query inputs; it is
//! validated once here and consumed untouched by the aggregation services.
//! Defaults are part of the contract: order records, all activity states,
//! cancelled/rejected excluded from monetary inputs, revenue-descending sort.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::sales_order;
use crate::errors::ServiceError;

/// Role names scanned when the caller supplies no explicit role set.
pub const DEFAULT_REPORT_ROLES: [&str; 2] = ["Sales Executive", "Manager"];

/// Order lifecycle states as stored on `sales_orders.status`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Processing,
    Delivered,
    Completed,
    Cancelled,
    Rejected,
}

/// Delivery states as stored on `sales_orders.delivery_status`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Dispatched,
    Delivered,
    Returned,
}

/// Which record stream a report scans.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Order,
    Visit,
}

/// Activity-state filter: `Active` keeps groups with at least one matching
/// record, `Inactive` lists roster members with none.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ActivityFilter {
    #[default]
    All,
    Active,
    Inactive,
}

/// Status filtering with explicit precedence.
///
/// `DefaultExclusions` removes cancelled/rejected orders from monetary
/// aggregation inputs. An `Explicit` filter replaces that default entirely:
/// a caller explicitly asking for cancelled orders gets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    DefaultExclusions,
    Explicit {
        status: Option<OrderStatus>,
        delivery_status: Option<DeliveryStatus>,
    },
}

impl StatusFilter {
    /// Builds the discriminated case from optional caller inputs.
    pub fn from_inputs(
        status: Option<OrderStatus>,
        delivery_status: Option<DeliveryStatus>,
    ) -> Self {
        if status.is_none() && delivery_status.is_none() {
            StatusFilter::DefaultExclusions
        } else {
            StatusFilter::Explicit {
                status,
                delivery_status,
            }
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, StatusFilter::Explicit { .. })
    }

    /// Scan predicate for monetary reports (executive, godown).
    pub fn admits_order(&self, order: &sales_order::Model) -> bool {
        match self {
            StatusFilter::DefaultExclusions => {
                !order.status.eq_ignore_ascii_case(OrderStatus::Cancelled.as_ref())
                    && !order.status.eq_ignore_ascii_case(OrderStatus::Rejected.as_ref())
            }
            StatusFilter::Explicit {
                status,
                delivery_status,
            } => {
                status.map_or(true, |s| order.status.eq_ignore_ascii_case(s.as_ref()))
                    && delivery_status.map_or(true, |d| {
                        order.delivery_status.eq_ignore_ascii_case(d.as_ref())
                    })
            }
        }
    }
}

/// Sort keys accepted by the list reports.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Revenue,
    Orders,
    Outstanding,
    Name,
    LastActivity,
    QuantityKg,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Inclusive reporting period, normalized to whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Normalizes calendar days to 00:00:00.000 .. 23:59:59.999 UTC.
    pub fn from_calendar_days(start: NaiveDate, end: NaiveDate) -> Result<Self, ServiceError> {
        if start > end {
            return Err(ServiceError::InvalidInput(format!(
                "start date {start} is after end date {end}"
            )));
        }
        let start = start
            .and_hms_milli_opt(0, 0, 0, 0)
            .ok_or_else(|| ServiceError::InvalidInput("invalid start date".into()))?
            .and_utc();
        let end = end
            .and_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| ServiceError::InvalidInput("invalid end date".into()))?
            .and_utc();
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Normalized filter descriptor consumed by every report service.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub date_range: Option<DateRange>,
    /// Restrict the executive report to one principal. Orphan groups are
    /// never appended when this is set.
    pub executive_id: Option<Uuid>,
    pub department: Option<String>,
    /// Explicit role set; `None` resolves to [`DEFAULT_REPORT_ROLES`].
    pub role_ids: Option<Vec<Uuid>>,
    /// Explicit warehouse filter, reconciled through the scope resolver
    /// before any fetch.
    pub godown_id: Option<Uuid>,
    pub record_kind: RecordKind,
    pub activity: ActivityFilter,
    pub status: StatusFilter,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ReportFilter {
    /// One-time boundary validation; services assume a validated filter.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let Some(range) = &self.date_range {
            if range.start > range.end {
                return Err(ServiceError::InvalidInput(
                    "date range start is after end".into(),
                ));
            }
        }
        if let Some(roles) = &self.role_ids {
            if roles.is_empty() {
                return Err(ServiceError::InvalidInput(
                    "role_ids must be omitted or non-empty".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order_with_status(status: &str, delivery: &str) -> sales_order::Model {
        sales_order::Model {
            id: Uuid::new_v4(),
            order_number: "ORD-1".into(),
            customer_id: Uuid::new_v4(),
            created_by: None,
            godown_id: None,
            status: status.into(),
            payment_status: "unpaid".into(),
            delivery_status: delivery.into(),
            subtotal: dec!(100),
            discount: dec!(0),
            tax_amount: dec!(0),
            total_amount: dec!(100),
            paid_amount: dec!(0),
            order_date: Utc::now(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn date_range_normalizes_to_day_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRange::from_calendar_days(start, end).unwrap();

        assert_eq!(range.start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(
            range.end.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2024-03-31T23:59:59.999Z"
        );
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert!(DateRange::from_calendar_days(start, end).is_err());
    }

    #[test]
    fn default_exclusions_drop_cancelled_and_rejected() {
        let filter = StatusFilter::DefaultExclusions;
        assert!(filter.admits_order(&order_with_status("pending", "pending")));
        assert!(filter.admits_order(&order_with_status("delivered", "delivered")));
        assert!(!filter.admits_order(&order_with_status("cancelled", "pending")));
        assert!(!filter.admits_order(&order_with_status("rejected", "pending")));
    }

    #[test]
    fn explicit_status_filter_overrides_default_exclusions() {
        let filter = StatusFilter::from_inputs(Some(OrderStatus::Cancelled), None);
        assert!(filter.is_explicit());
        assert!(filter.admits_order(&order_with_status("cancelled", "pending")));
        assert!(!filter.admits_order(&order_with_status("pending", "pending")));
    }

    #[test]
    fn explicit_delivery_filter_matches_both_fields_when_given() {
        let filter =
            StatusFilter::from_inputs(Some(OrderStatus::Delivered), Some(DeliveryStatus::Returned));
        assert!(filter.admits_order(&order_with_status("delivered", "returned")));
        assert!(!filter.admits_order(&order_with_status("delivered", "delivered")));
    }

    #[test]
    fn no_inputs_resolve_to_default_case() {
        assert_eq!(
            StatusFilter::from_inputs(None, None),
            StatusFilter::DefaultExclusions
        );
    }

    #[test]
    fn sort_key_parses_from_query_strings() {
        assert_eq!("quantity_kg".parse::<SortKey>().unwrap(), SortKey::QuantityKg);
        assert_eq!("revenue".parse::<SortKey>().unwrap(), SortKey::Revenue);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    }
}
