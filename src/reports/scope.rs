//! Warehouse access scoping.
//!
//! Every report resolves the requesting principal's godown scope through
//! [`resolve_scope`] before building its record filter. No report path may
//! bypass this: the resolver is the single place where an explicit warehouse
//! filter is reconciled against what the requester may actually see.

use std::collections::HashSet;

use uuid::Uuid;

use crate::entities::user;

/// Result of reconciling a principal's godown assignment against an optional
/// explicit warehouse filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GodownScope {
    /// Principal has no warehouse assignment at all; sees everything.
    Unrestricted,
    /// Principal may only see these godowns.
    Restricted(HashSet<Uuid>),
    /// Explicit filter fell outside the allowed set. The caller must render
    /// a zeroed, empty report; this is not an error, and it must not reveal
    /// whether the requested godown exists.
    Denied,
}

impl GodownScope {
    /// Whether a record stamped with `godown_id` falls inside this scope.
    /// Records with no godown stamp are visible only to unrestricted
    /// principals.
    pub fn allows(&self, godown_id: Option<Uuid>) -> bool {
        match self {
            GodownScope::Unrestricted => true,
            GodownScope::Restricted(allowed) => godown_id.is_some_and(|id| allowed.contains(&id)),
            GodownScope::Denied => false,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, GodownScope::Denied)
    }
}

/// Computes the set of godowns `requester` may see and narrows it to
/// `requested` when an explicit warehouse filter is present.
///
/// A principal with neither a primary godown nor any access rows is a
/// legacy/superuser account and is unrestricted. Otherwise the allowed set is
/// `{primary} ∪ accessible`; an explicit filter inside it narrows the scope
/// to that one godown, and one outside it yields [`GodownScope::Denied`].
pub fn resolve_scope(
    requester: &user::Model,
    accessible: &[Uuid],
    requested: Option<Uuid>,
) -> GodownScope {
    let mut allowed: HashSet<Uuid> = accessible.iter().copied().collect();
    if let Some(primary) = requester.primary_godown_id {
        allowed.insert(primary);
    }

    if allowed.is_empty() {
        return match requested {
            Some(id) => GodownScope::Restricted(HashSet::from([id])),
            None => GodownScope::Unrestricted,
        };
    }

    match requested {
        Some(id) if allowed.contains(&id) => GodownScope::Restricted(HashSet::from([id])),
        Some(_) => GodownScope::Denied,
        None => GodownScope::Restricted(allowed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn requester(primary: Option<Uuid>) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            name: "Asha Verma".into(),
            employee_id: "EMP-014".into(),
            email: "asha@example.com".into(),
            role_id: None,
            department: None,
            primary_godown_id: primary,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_assignment_means_unrestricted() {
        let scope = resolve_scope(&requester(None), &[], None);
        assert_eq!(scope, GodownScope::Unrestricted);
        assert!(scope.allows(Some(Uuid::new_v4())));
        assert!(scope.allows(None));
    }

    #[test]
    fn unrestricted_requester_narrows_to_explicit_filter() {
        let w1 = Uuid::new_v4();
        let scope = resolve_scope(&requester(None), &[], Some(w1));
        assert_eq!(scope, GodownScope::Restricted(HashSet::from([w1])));
    }

    #[test]
    fn allowed_set_is_primary_union_accessible() {
        let primary = Uuid::new_v4();
        let extra = Uuid::new_v4();
        let scope = resolve_scope(&requester(Some(primary)), &[extra], None);
        assert_eq!(scope, GodownScope::Restricted(HashSet::from([primary, extra])));
        assert!(scope.allows(Some(primary)));
        assert!(scope.allows(Some(extra)));
        assert!(!scope.allows(Some(Uuid::new_v4())));
        assert!(!scope.allows(None));
    }

    #[test]
    fn explicit_filter_inside_scope_narrows_to_one() {
        let primary = Uuid::new_v4();
        let extra = Uuid::new_v4();
        let scope = resolve_scope(&requester(Some(primary)), &[extra], Some(extra));
        assert_eq!(scope, GodownScope::Restricted(HashSet::from([extra])));
        assert!(!scope.allows(Some(primary)));
    }

    #[test]
    fn explicit_filter_outside_scope_is_denied() {
        let primary = Uuid::new_v4();
        let scope = resolve_scope(&requester(Some(primary)), &[], Some(Uuid::new_v4()));
        assert!(scope.is_denied());
        assert!(!scope.allows(Some(primary)));
    }
}
