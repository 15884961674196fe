//! Tenant-scoped access predicates.
//!
//! Two separately named operations answer the two questions a collection
//! asks about an actor:
//!
//! - [`evaluate_document_access`] - may the actor touch *this* document?
//!   Used where only a single document is evaluated (field-level checks,
//!   writes against a stored document).
//! - [`build_list_filter`] - *which* documents may the actor see? Used by
//!   list and read queries that support query-level filtering.
//!
//! Neither ever fails for ordinary denial: denial is `false` or
//! [`ListAccess::Denied`].

use tracing::trace;

use super::filter::{ListAccess, Where};
use crate::tenant::{Actor, TenantId, TenantRole, User};

/// Returns the tenants in which `user` holds one of `accepted_roles`,
/// deduplicated and in membership order.
pub fn effective_tenants(user: &User, accepted_roles: &[TenantRole]) -> Vec<TenantId> {
    let mut tenants = Vec::new();
    for membership in &user.tenants {
        if accepted_roles.contains(&membership.role) && !tenants.contains(&membership.tenant) {
            tenants.push(membership.tenant);
        }
    }
    tenants
}

/// Decides whether `actor` may access a single document.
///
/// - System users: always `true`.
/// - Tenant users: `true` if they hold an accepted role in at least one
///   tenant and, when `document_tenant` is known, in that tenant.
/// - Tenant machines: `true` if `document_tenant` is unknown or equals the
///   machine's own tenant.
pub fn evaluate_document_access(
    actor: &Actor,
    accepted_roles: &[TenantRole],
    document_tenant: Option<TenantId>,
) -> bool {
    let allowed = match actor {
        Actor::SystemUser(_) => true,
        Actor::TenantUser(user) => {
            let tenants = effective_tenants(user, accepted_roles);
            match document_tenant {
                _ if tenants.is_empty() => false,
                Some(tenant) => tenants.contains(&tenant),
                None => true,
            }
        }
        Actor::TenantMachine { tenant } => document_tenant.is_none_or(|doc| doc == *tenant),
    };

    trace!(
        actor = %actor.label(),
        document_tenant = ?document_tenant,
        allowed,
        "Evaluated document access"
    );
    allowed
}

/// Builds the list-level access for `actor`.
///
/// - System users: [`ListAccess::Unrestricted`].
/// - Tenant users: `{tenant: {in: [..]}}` over their effective tenants, or
///   [`ListAccess::Denied`] when they have none.
/// - Tenant machines: `{tenant: {equals: id}}`.
pub fn build_list_filter(actor: &Actor, accepted_roles: &[TenantRole]) -> ListAccess {
    match actor {
        Actor::SystemUser(_) => ListAccess::Unrestricted,
        Actor::TenantUser(user) => {
            let tenants = effective_tenants(user, accepted_roles);
            if tenants.is_empty() {
                ListAccess::Denied
            } else {
                ListAccess::Filtered(Where::tenant_in(&tenants))
            }
        }
        Actor::TenantMachine { tenant } => ListAccess::Filtered(Where::tenant_equals(*tenant)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADMIN: &[TenantRole] = &[TenantRole::Admin];
    const ANY: &[TenantRole] = &TenantRole::ALL;

    fn user_with(memberships: &[(i64, TenantRole)]) -> Actor {
        let mut user = User::new("u1", "u1@example.com");
        for (tenant, role) in memberships {
            user = user.with_membership(*tenant, *role);
        }
        Actor::from_user(user)
    }

    fn system_user() -> Actor {
        Actor::from_user(User::new("root", "root@example.com").as_system_user())
    }

    #[test]
    fn test_system_user_unconditional() {
        let actor = system_user();
        assert!(evaluate_document_access(&actor, ADMIN, Some(TenantId::new(42))));
        assert!(evaluate_document_access(&actor, ADMIN, None));
        assert_eq!(build_list_filter(&actor, ADMIN), ListAccess::Unrestricted);
    }

    #[test]
    fn test_admin_of_document_tenant() {
        let actor = user_with(&[(7, TenantRole::Admin)]);
        assert!(evaluate_document_access(&actor, ADMIN, Some(TenantId::new(7))));
        assert_eq!(
            serde_json::to_value(build_list_filter(&actor, ADMIN)).unwrap(),
            json!({"tenant": {"in": [7]}})
        );
    }

    #[test]
    fn test_editor_denied_admin_requirement() {
        let actor = user_with(&[(7, TenantRole::Editor)]);
        assert!(!evaluate_document_access(&actor, ADMIN, Some(TenantId::new(7))));
        assert!(!evaluate_document_access(&actor, ADMIN, None));
        assert!(build_list_filter(&actor, ADMIN).is_denied());
    }

    #[test]
    fn test_no_memberships_denied() {
        let actor = user_with(&[]);
        assert!(!evaluate_document_access(&actor, ANY, None));
        assert!(build_list_filter(&actor, ANY).is_denied());
    }

    #[test]
    fn test_other_tenant_denied() {
        let actor = user_with(&[(7, TenantRole::Admin)]);
        assert!(!evaluate_document_access(&actor, ADMIN, Some(TenantId::new(8))));
    }

    #[test]
    fn test_effective_tenants_filters_by_role() {
        let actor = user_with(&[
            (1, TenantRole::Admin),
            (2, TenantRole::Viewer),
            (3, TenantRole::Editor),
            (1, TenantRole::Editor),
        ]);
        let user = actor.user().unwrap();
        assert_eq!(
            effective_tenants(user, &[TenantRole::Admin, TenantRole::Editor]),
            vec![TenantId::new(1), TenantId::new(3)]
        );
        assert_eq!(effective_tenants(user, &[TenantRole::Viewer]), vec![TenantId::new(2)]);
    }

    #[test]
    fn test_machine_list_filter_is_equals() {
        let actor = Actor::machine(99);
        let access = build_list_filter(&actor, ADMIN);
        assert_eq!(
            serde_json::to_value(&access).unwrap(),
            json!({"tenant": {"equals": 99}})
        );
    }

    #[test]
    fn test_machine_document_comparison() {
        let actor = Actor::machine(99);
        assert!(evaluate_document_access(&actor, ADMIN, Some(TenantId::new(99))));
        assert!(!evaluate_document_access(&actor, ADMIN, Some(TenantId::new(98))));
        assert!(evaluate_document_access(&actor, ADMIN, None));
    }
}
