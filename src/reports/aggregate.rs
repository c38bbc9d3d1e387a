//! In-memory grouping over fetched order/visit rows.
//!
//! Services fetch the scope- and status-filtered record set, then hand plain
//! row slices to these pure functions. Grouping is roster-driven: every
//! principal/godown/customer in scope gets a row, zeroed when nothing
//! matched, so the activity filter is a plain retain over the result.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{customer, godown, order_item, sales_order, user, visit};
use crate::reports::filter::{DeliveryStatus, OrderStatus, SortKey, SortOrder};
use crate::reports::units::normalize_to_kg;

/// Aggregates shared by every grouping dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct GroupMetrics {
    pub total_records: i64,
    pub total_revenue: Decimal,
    pub total_paid: Decimal,
    pub total_outstanding: Decimal,
    pub pending_count: i64,
    pub approved_count: i64,
    pub delivered_count: i64,
    pub completed_count: i64,
    pub distinct_customers: i64,
    pub avg_order_value: Decimal,
    pub last_activity_days: Option<i64>,
}

/// One executive's aggregates joined with principal attributes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExecutiveRow {
    pub executive_id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub department: Option<String>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub metrics: GroupMetrics,
}

/// Aggregates for records whose owning principal is gone. Carries the same
/// metric shape as a normal group so engine-wide totals stay consistent.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrphanRow {
    pub label: String,
    #[serde(flatten)]
    pub metrics: GroupMetrics,
}

/// A row of the executive report. Synthetic groups are distinct variants so
/// consumers cannot mistake them for real principals.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "group_kind", rename_all = "snake_case")]
pub enum ExecutiveGroup {
    /// Records owned by an existing principal.
    Executive(ExecutiveRow),
    /// Records with no creator reference at all.
    DeletedUser(OrphanRow),
    /// Records whose creator reference no longer resolves.
    OrphanedRecords(OrphanRow),
}

impl ExecutiveGroup {
    pub fn metrics(&self) -> &GroupMetrics {
        match self {
            ExecutiveGroup::Executive(row) => &row.metrics,
            ExecutiveGroup::DeletedUser(row) | ExecutiveGroup::OrphanedRecords(row) => &row.metrics,
        }
    }

    fn sort_id(&self) -> Option<Uuid> {
        match self {
            ExecutiveGroup::Executive(row) => Some(row.executive_id),
            _ => None,
        }
    }

    fn display_name(&self) -> &str {
        match self {
            ExecutiveGroup::Executive(row) => &row.name,
            ExecutiveGroup::DeletedUser(row) | ExecutiveGroup::OrphanedRecords(row) => &row.label,
        }
    }
}

/// One warehouse's aggregates joined with godown attributes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GodownRow {
    pub godown_id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(flatten)]
    pub metrics: GroupMetrics,
}

/// One customer's purchase aggregates, including normalized kilograms.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomerRow {
    pub customer_id: Uuid,
    pub business_name: String,
    pub customer_type: String,
    pub assigned_godown_id: Option<Uuid>,
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

/// A roster principal plus the joined role name, as the executive report
/// presents it.
#[derive(Debug, Clone)]
pub struct RosterUser {
    pub user: user::Model,
    pub role_name: Option<String>,
}

const DELETED_USER_LABEL: &str = "Deleted User";
const ORPHANED_RECORDS_LABEL: &str = "Deleted User (Orphaned)";

/// Whether an order's money and kilograms count toward customer totals.
/// Cancelled/rejected/returned orders stay visible in order counts but
/// contribute zero.
pub fn order_contributes_totals(order: &sales_order::Model) -> bool {
    !order.status.eq_ignore_ascii_case(OrderStatus::Cancelled.as_ref())
        && !order.status.eq_ignore_ascii_case(OrderStatus::Rejected.as_ref())
        && !order
            .delivery_status
            .eq_ignore_ascii_case(DeliveryStatus::Returned.as_ref())
}

#[derive(Default)]
struct MetricsBuilder {
    records: i64,
    orders: i64,
    revenue: Decimal,
    paid: Decimal,
    pending: i64,
    approved: i64,
    delivered: i64,
    completed: i64,
    customers: HashSet<Uuid>,
    last_activity: Option<DateTime<Utc>>,
}

impl MetricsBuilder {
    fn touch(&mut self, at: DateTime<Utc>) {
        if self.last_activity.map_or(true, |seen| at > seen) {
            self.last_activity = Some(at);
        }
    }

    fn add_order(&mut self, order: &sales_order::Model) {
        self.records += 1;
        self.orders += 1;
        self.revenue += order.total_amount;
        self.paid += order.paid_amount;
        self.customers.insert(order.customer_id);
        self.touch(order.order_date);

        let status = order.status.to_ascii_lowercase();
        match status.as_str() {
            "pending" => self.pending += 1,
            "approved" => self.approved += 1,
            "delivered" => self.delivered += 1,
            "completed" => self.completed += 1,
            _ => {}
        }
    }

    fn add_visit(&mut self, v: &visit::Model) {
        self.records += 1;
        if let Some(customer_id) = v.customer_id {
            self.customers.insert(customer_id);
        }
        self.touch(v.visit_date);
    }

    fn finish(self, now: DateTime<Utc>) -> GroupMetrics {
        let avg_order_value = if self.orders > 0 {
            self.revenue / Decimal::from(self.orders)
        } else {
            Decimal::ZERO
        };
        GroupMetrics {
            total_records: self.records,
            total_revenue: self.revenue,
            total_paid: self.paid,
            total_outstanding: self.revenue - self.paid,
            pending_count: self.pending,
            approved_count: self.approved,
            delivered_count: self.delivered,
            completed_count: self.completed,
            distinct_customers: self.customers.len() as i64,
            avg_order_value,
            last_activity_days: self
                .last_activity
                .map(|seen| now.signed_duration_since(seen).num_days()),
        }
    }
}

/// Groups records by creating principal.
///
/// `known_user_ids` covers every existing principal, not just the roster:
/// records from principals outside the roster (wrong role/department) are
/// skipped, while records whose creator does not exist at all land in the
/// orphan buckets. Orphan groups are appended only when the report is not
/// already scoped to one principal.
pub fn aggregate_executives(
    orders: &[sales_order::Model],
    visits: &[visit::Model],
    roster: &[RosterUser],
    known_user_ids: &HashSet<Uuid>,
    now: DateTime<Utc>,
    single_principal: bool,
) -> Vec<ExecutiveGroup> {
    let roster_ids: HashSet<Uuid> = roster.iter().map(|r| r.user.id).collect();
    let mut builders: HashMap<Uuid, MetricsBuilder> = HashMap::new();
    let mut deleted = MetricsBuilder::default();
    let mut orphaned = MetricsBuilder::default();
    let mut deleted_seen = false;
    let mut orphaned_seen = false;

    for order in orders {
        match order.created_by {
            Some(id) if roster_ids.contains(&id) => {
                builders.entry(id).or_default().add_order(order);
            }
            Some(id) if known_user_ids.contains(&id) => {}
            Some(_) => {
                orphaned.add_order(order);
                orphaned_seen = true;
            }
            None => {
                deleted.add_order(order);
                deleted_seen = true;
            }
        }
    }

    for v in visits {
        match v.created_by {
            Some(id) if roster_ids.contains(&id) => {
                builders.entry(id).or_default().add_visit(v);
            }
            Some(id) if known_user_ids.contains(&id) => {}
            Some(_) => {
                orphaned.add_visit(v);
                orphaned_seen = true;
            }
            None => {
                deleted.add_visit(v);
                deleted_seen = true;
            }
        }
    }

    let mut groups: Vec<ExecutiveGroup> = roster
        .iter()
        .map(|member| {
            let metrics = builders
                .remove(&member.user.id)
                .unwrap_or_default()
                .finish(now);
            ExecutiveGroup::Executive(ExecutiveRow {
                executive_id: member.user.id,
                name: member.user.name.clone(),
                employee_id: member.user.employee_id.clone(),
                department: member.user.department.clone(),
                role: member.role_name.clone(),
                metrics,
            })
        })
        .collect();

    if !single_principal {
        if deleted_seen {
            groups.push(ExecutiveGroup::DeletedUser(OrphanRow {
                label: DELETED_USER_LABEL.to_string(),
                metrics: deleted.finish(now),
            }));
        }
        if orphaned_seen {
            groups.push(ExecutiveGroup::OrphanedRecords(OrphanRow {
                label: ORPHANED_RECORDS_LABEL.to_string(),
                metrics: orphaned.finish(now),
            }));
        }
    }

    groups
}

/// Groups orders by recorded godown. Orders without a godown stamp do not
/// belong to any warehouse and are skipped here; the executive report is the
/// reconciliation surface for those.
pub fn aggregate_godowns(
    orders: &[sales_order::Model],
    roster: &[godown::Model],
    now: DateTime<Utc>,
) -> Vec<GodownRow> {
    let roster_ids: HashSet<Uuid> = roster.iter().map(|g| g.id).collect();
    let mut builders: HashMap<Uuid, MetricsBuilder> = HashMap::new();

    for order in orders {
        if let Some(id) = order.godown_id {
            if roster_ids.contains(&id) {
                builders.entry(id).or_default().add_order(order);
            }
        }
    }

    roster
        .iter()
        .map(|g| {
            let metrics = builders.remove(&g.id).unwrap_or_default().finish(now);
            GodownRow {
                godown_id: g.id,
                name: g.name.clone(),
                city: g.city.clone(),
                state: g.state.clone(),
                metrics,
            }
        })
        .collect()
}

#[derive(Default)]
struct CustomerBuilder {
    orders: i64,
    revenue: Decimal,
    paid: Decimal,
    quantity_kg: Decimal,
    first_order: Option<DateTime<Utc>>,
    last_order: Option<DateTime<Utc>>,
}

/// Groups orders by customer, normalizing every line item to kilograms.
///
/// All admitted orders count toward `total_orders`; only those passing
/// [`order_contributes_totals`] add money and kilograms.
pub fn aggregate_customers(
    orders: &[sales_order::Model],
    items_by_order: &HashMap<Uuid, Vec<order_item::Model>>,
    roster: &[customer::Model],
    now: DateTime<Utc>,
) -> Vec<CustomerRow> {
    let roster_ids: HashSet<Uuid> = roster.iter().map(|c| c.id).collect();
    let mut builders: HashMap<Uuid, CustomerBuilder> = HashMap::new();

    for order in orders {
        if !roster_ids.contains(&order.customer_id) {
            continue;
        }
        let entry = builders.entry(order.customer_id).or_default();
        entry.orders += 1;
        if entry.first_order.map_or(true, |seen| order.order_date < seen) {
            entry.first_order = Some(order.order_date);
        }
        if entry.last_order.map_or(true, |seen| order.order_date > seen) {
            entry.last_order = Some(order.order_date);
        }

        if order_contributes_totals(order) {
            entry.revenue += order.total_amount;
            entry.paid += order.paid_amount;
            if let Some(items) = items_by_order.get(&order.id) {
                for item in items {
                    entry.quantity_kg +=
                        normalize_to_kg(item.quantity, &item.unit, item.packaging.as_deref());
                }
            }
        }
    }

    roster
        .iter()
        .map(|c| {
            let b = builders.remove(&c.id).unwrap_or_default();
            let avg_order_value = if b.orders > 0 {
                b.revenue / Decimal::from(b.orders)
            } else {
                Decimal::ZERO
            };
            CustomerRow {
                customer_id: c.id,
                business_name: c.business_name.clone(),
                customer_type: c.customer_type.clone(),
                assigned_godown_id: c.assigned_godown_id,
                total_orders: b.orders,
                total_revenue: b.revenue,
                total_paid: b.paid,
                total_outstanding: b.revenue - b.paid,
                total_quantity_kg: b.quantity_kg,
                avg_order_value,
                first_order_date: b.first_order,
                last_order_date: b.last_order,
                days_since_last_order: b
                    .last_order
                    .map(|seen| now.signed_duration_since(seen).num_days()),
            }
        })
        .collect()
}

fn directed(ordering: std::cmp::Ordering, order: SortOrder) -> std::cmp::Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Sorts known executive groups by the caller's key, ascending UUID as the
/// stable tie-break. Synthetic groups keep their appended position at the
/// end of the list.
pub fn sort_executive_groups(groups: &mut Vec<ExecutiveGroup>, key: SortKey, order: SortOrder) {
    let orphans: Vec<ExecutiveGroup> = groups
        .iter()
        .filter(|g| g.sort_id().is_none())
        .cloned()
        .collect();
    groups.retain(|g| g.sort_id().is_some());

    groups.sort_by(|a, b| {
        let (am, bm) = (a.metrics(), b.metrics());
        let primary = match key {
            SortKey::Revenue => am.total_revenue.cmp(&bm.total_revenue),
            SortKey::Orders => am.total_records.cmp(&bm.total_records),
            SortKey::Outstanding => am.total_outstanding.cmp(&bm.total_outstanding),
            SortKey::Name => a.display_name().cmp(b.display_name()),
            SortKey::LastActivity => am.last_activity_days.cmp(&bm.last_activity_days),
            SortKey::QuantityKg => am.total_revenue.cmp(&bm.total_revenue),
        };
        directed(primary, order).then_with(|| a.sort_id().cmp(&b.sort_id()))
    });

    groups.extend(orphans);
}

pub fn sort_godown_rows(rows: &mut [GodownRow], key: SortKey, order: SortOrder) {
    rows.sort_by(|a, b| {
        let primary = match key {
            SortKey::Revenue => a.metrics.total_revenue.cmp(&b.metrics.total_revenue),
            SortKey::Orders => a.metrics.total_records.cmp(&b.metrics.total_records),
            SortKey::Outstanding => a
                .metrics
                .total_outstanding
                .cmp(&b.metrics.total_outstanding),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::LastActivity => a
                .metrics
                .last_activity_days
                .cmp(&b.metrics.last_activity_days),
            SortKey::QuantityKg => a.metrics.total_revenue.cmp(&b.metrics.total_revenue),
        };
        directed(primary, order).then_with(|| a.godown_id.cmp(&b.godown_id))
    });
}

pub fn sort_customer_rows(rows: &mut [CustomerRow], key: SortKey, order: SortOrder) {
    rows.sort_by(|a, b| {
        let primary = match key {
            SortKey::Revenue => a.total_revenue.cmp(&b.total_revenue),
            SortKey::Orders => a.total_orders.cmp(&b.total_orders),
            SortKey::Outstanding => a.total_outstanding.cmp(&b.total_outstanding),
            SortKey::Name => a.business_name.cmp(&b.business_name),
            SortKey::LastActivity => a.days_since_last_order.cmp(&b.days_since_last_order),
            SortKey::QuantityKg => a.total_quantity_kg.cmp(&b.total_quantity_kg),
        };
        directed(primary, order).then_with(|| a.customer_id.cmp(&b.customer_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    fn order(
        created_by: Option<Uuid>,
        customer_id: Uuid,
        total: Decimal,
        paid: Decimal,
        status: &str,
        day: u32,
    ) -> sales_order::Model {
        sales_order::Model {
            id: Uuid::new_v4(),
            order_number: format!("ORD-{day}"),
            customer_id,
            created_by,
            godown_id: None,
            status: status.into(),
            payment_status: "partial".into(),
            delivery_status: "pending".into(),
            subtotal: total,
            discount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_amount: total,
            paid_amount: paid,
            order_date: ts(day),
            created_at: ts(day),
            updated_at: None,
        }
    }

    fn roster_user(id: Uuid, name: &str) -> RosterUser {
        RosterUser {
            user: user::Model {
                id,
                name: name.into(),
                employee_id: format!("EMP-{}", &name[..1]),
                email: format!("{}@example.com", name.to_ascii_lowercase()),
                role_id: None,
                department: Some("Sales".into()),
                primary_godown_id: None,
                is_active: true,
                created_at: ts(1),
            },
            role_name: Some("Sales Executive".into()),
        }
    }

    #[test]
    fn orphan_reconciliation_preserves_engine_wide_totals() {
        let exec = Uuid::new_v4();
        let customer_id = Uuid::new_v4();
        let roster = vec![roster_user(exec, "Ravi")];
        let known: HashSet<Uuid> = [exec].into();

        let mut orders = Vec::new();
        for day in 1..=3 {
            orders.push(order(
                Some(exec),
                customer_id,
                dec!(100),
                dec!(100),
                "completed",
                day,
            ));
        }
        for day in 4..=5 {
            orders.push(order(None, customer_id, dec!(50), dec!(0), "pending", day));
        }

        let groups = aggregate_executives(&orders, &[], &roster, &known, ts(10), false);
        assert_eq!(groups.len(), 2);

        let total: Decimal = groups.iter().map(|g| g.metrics().total_revenue).sum();
        assert_eq!(total, dec!(400));

        match &groups[0] {
            ExecutiveGroup::Executive(row) => {
                assert_eq!(row.metrics.total_revenue, dec!(300));
                assert_eq!(row.metrics.completed_count, 3);
            }
            other => panic!("expected executive group, got {other:?}"),
        }
        match &groups[1] {
            ExecutiveGroup::DeletedUser(row) => {
                assert_eq!(row.label, "Deleted User");
                assert_eq!(row.metrics.total_revenue, dec!(100));
            }
            other => panic!("expected deleted-user group, got {other:?}"),
        }
    }

    #[test]
    fn dangling_creator_lands_in_orphaned_group() {
        let ghost = Uuid::new_v4();
        let orders = vec![order(
            Some(ghost),
            Uuid::new_v4(),
            dec!(75),
            dec!(0),
            "pending",
            2,
        )];
        let groups = aggregate_executives(&orders, &[], &[], &HashSet::new(), ts(5), false);

        assert_eq!(groups.len(), 1);
        match &groups[0] {
            ExecutiveGroup::OrphanedRecords(row) => {
                assert_eq!(row.label, "Deleted User (Orphaned)");
                assert_eq!(row.metrics.total_revenue, dec!(75));
            }
            other => panic!("expected orphaned group, got {other:?}"),
        }
    }

    #[test]
    fn single_principal_reports_never_surface_orphans() {
        let exec = Uuid::new_v4();
        let roster = vec![roster_user(exec, "Ravi")];
        let known: HashSet<Uuid> = [exec].into();
        let orders = vec![
            order(Some(exec), Uuid::new_v4(), dec!(10), dec!(10), "pending", 1),
            order(None, Uuid::new_v4(), dec!(99), dec!(0), "pending", 2),
        ];

        let groups = aggregate_executives(&orders, &[], &roster, &known, ts(5), true);
        assert_eq!(groups.len(), 1);
        assert!(matches!(groups[0], ExecutiveGroup::Executive(_)));
    }

    #[test]
    fn zero_record_groups_have_zero_average() {
        let exec = Uuid::new_v4();
        let roster = vec![roster_user(exec, "Meena")];
        let known: HashSet<Uuid> = [exec].into();

        let groups = aggregate_executives(&[], &[], &roster, &known, ts(5), false);
        assert_eq!(groups.len(), 1);
        let metrics = groups[0].metrics();
        assert_eq!(metrics.total_records, 0);
        assert_eq!(metrics.avg_order_value, Decimal::ZERO);
        assert_eq!(metrics.last_activity_days, None);
    }

    #[test]
    fn visits_count_as_records_with_zero_money() {
        let exec = Uuid::new_v4();
        let roster = vec![roster_user(exec, "Ravi")];
        let known: HashSet<Uuid> = [exec].into();
        let customer_id = Uuid::new_v4();

        let visits = vec![visit::Model {
            id: Uuid::new_v4(),
            created_by: Some(exec),
            godown_id: None,
            customer_id: Some(customer_id),
            location: Some("Indore".into()),
            image_url: None,
            visit_date: ts(3),
            created_at: ts(3),
        }];
        let orders = vec![order(
            Some(exec),
            customer_id,
            dec!(120),
            dec!(20),
            "approved",
            1,
        )];

        let groups = aggregate_executives(&orders, &visits, &roster, &known, ts(10), false);
        let metrics = groups[0].metrics();
        assert_eq!(metrics.total_records, 2);
        assert_eq!(metrics.total_revenue, dec!(120));
        assert_eq!(metrics.distinct_customers, 1);
        assert_eq!(metrics.last_activity_days, Some(7));
    }

    #[test]
    fn records_from_principals_outside_roster_are_skipped() {
        let insider = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let roster = vec![roster_user(insider, "Ravi")];
        let known: HashSet<Uuid> = [insider, outsider].into();

        let orders = vec![
            order(Some(insider), Uuid::new_v4(), dec!(40), dec!(0), "pending", 1),
            order(Some(outsider), Uuid::new_v4(), dec!(60), dec!(0), "pending", 2),
        ];
        let groups = aggregate_executives(&orders, &[], &roster, &known, ts(5), false);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].metrics().total_revenue, dec!(40));
    }

    #[test]
    fn customer_aggregation_zeroes_cancelled_but_counts_them() {
        let cust = customer::Model {
            id: Uuid::new_v4(),
            business_name: "Agarwal Traders".into(),
            customer_type: "retailer".into(),
            city: None,
            state: None,
            credit_limit: dec!(100000),
            outstanding_amount: Decimal::ZERO,
            assigned_godown_id: None,
            created_at: ts(1),
        };

        let good = order(None, cust.id, dec!(500), dec!(200), "delivered", 2);
        let cancelled = order(None, cust.id, dec!(900), dec!(0), "cancelled", 4);

        let mut items = HashMap::new();
        items.insert(
            good.id,
            vec![order_item::Model {
                id: Uuid::new_v4(),
                order_id: good.id,
                product_name: "Chakki Atta".into(),
                grade: Some("Premium".into()),
                quantity: dec!(2),
                unit: "Bags".into(),
                rate_per_unit: dec!(250),
                total_amount: dec!(500),
                packaging: Some("25kg Bags".into()),
            }],
        );
        items.insert(
            cancelled.id,
            vec![order_item::Model {
                id: Uuid::new_v4(),
                order_id: cancelled.id,
                product_name: "Chakki Atta".into(),
                grade: None,
                quantity: dec!(1),
                unit: "Ton".into(),
                rate_per_unit: dec!(900),
                total_amount: dec!(900),
                packaging: None,
            }],
        );

        let rows = aggregate_customers(
            &[good.clone(), cancelled],
            &items,
            std::slice::from_ref(&cust),
            ts(10),
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.total_orders, 2);
        assert_eq!(row.total_revenue, dec!(500));
        assert_eq!(row.total_quantity_kg, dec!(50));
        assert_eq!(row.first_order_date, Some(ts(2)));
        assert_eq!(row.last_order_date, Some(ts(4)));
        assert_eq!(row.days_since_last_order, Some(6));
    }

    #[test]
    fn godown_grouping_skips_unstamped_orders() {
        let g = godown::Model {
            id: Uuid::new_v4(),
            name: "Indore Godown".into(),
            city: Some("Indore".into()),
            state: Some("MP".into()),
            created_at: ts(1),
        };
        let mut stamped = order(None, Uuid::new_v4(), dec!(300), dec!(300), "completed", 3);
        stamped.godown_id = Some(g.id);
        let unstamped = order(None, Uuid::new_v4(), dec!(999), dec!(0), "pending", 4);

        let rows = aggregate_godowns(&[stamped, unstamped], std::slice::from_ref(&g), ts(5));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metrics.total_revenue, dec!(300));
    }

    #[test]
    fn executive_sort_is_stable_and_pins_orphans_last() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let roster = vec![roster_user(a, "Ravi"), roster_user(b, "Meena")];
        let known: HashSet<Uuid> = [a, b].into();
        let orders = vec![
            order(Some(a), Uuid::new_v4(), dec!(100), dec!(0), "pending", 1),
            order(Some(b), Uuid::new_v4(), dec!(300), dec!(0), "pending", 2),
            order(None, Uuid::new_v4(), dec!(900), dec!(0), "pending", 3),
        ];

        let mut groups = aggregate_executives(&orders, &[], &roster, &known, ts(5), false);
        sort_executive_groups(&mut groups, SortKey::Revenue, SortOrder::Desc);

        assert_eq!(groups[0].metrics().total_revenue, dec!(300));
        assert_eq!(groups[1].metrics().total_revenue, dec!(100));
        assert!(matches!(groups[2], ExecutiveGroup::DeletedUser(_)));
    }

    #[test]
    fn last_activity_reflects_most_recent_record() {
        let exec = Uuid::new_v4();
        let roster = vec![roster_user(exec, "Ravi")];
        let known: HashSet<Uuid> = [exec].into();
        let orders = vec![
            order(Some(exec), Uuid::new_v4(), dec!(10), dec!(0), "pending", 1),
            order(Some(exec), Uuid::new_v4(), dec!(10), dec!(0), "pending", 8),
        ];

        let now = ts(8) + Duration::days(2);
        let groups = aggregate_executives(&orders, &[], &roster, &known, now, false);
        assert_eq!(groups[0].metrics().last_activity_days, Some(2));
    }
}
