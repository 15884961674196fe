//! Per-collection access rules.
//!
//! A [`CollectionAccess`] says, for each [`Operation`], which tenant roles are
//! accepted and whether tenant machines may perform it. It delegates the
//! actual decision to the predicates in [`super::predicates`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::{ListAccess, Where};
use super::predicates::{build_list_filter, evaluate_document_access};
use crate::tenant::{Actor, TenantId, TenantRole};
use crate::types::Collection;

/// Operations that can be performed on documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create new documents.
    Create,
    /// Read or list documents.
    Read,
    /// Update existing documents.
    Update,
    /// Delete documents.
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Who may perform one operation on a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRule {
    /// Tenant roles accepted for tenant users.
    pub roles: Vec<TenantRole>,
    /// Whether tenant machines may perform the operation in their own tenant.
    pub machines: bool,
}

impl OperationRule {
    fn new(roles: &[TenantRole], machines: bool) -> Self {
        Self {
            roles: roles.to_vec(),
            machines,
        }
    }

    fn nobody() -> Self {
        Self::new(&[], false)
    }
}

/// Access rules of one collection.
///
/// # Examples
///
/// ```
/// use meridian_tenancy::access::{CollectionAccess, Operation};
/// use meridian_tenancy::tenant::{Actor, TenantId, TenantRole, User};
/// use meridian_tenancy::types::Collection;
///
/// let rules = CollectionAccess::for_collection(Collection::Pages);
/// let editor = Actor::from_user(
///     User::new("u1", "ed@acme.test").with_membership(7, TenantRole::Editor),
/// );
///
/// assert!(rules.can_access_document(&editor, Operation::Update, Some(TenantId::new(7))));
/// assert!(!rules.can_access_document(&editor, Operation::Delete, Some(TenantId::new(7))));
/// ```
#[derive(Debug, Clone)]
pub struct CollectionAccess {
    collection: Collection,
    rules: HashMap<Operation, OperationRule>,
    public_read: bool,
}

impl CollectionAccess {
    /// Returns the default rules for a collection.
    ///
    /// Every role reads, admins and editors create and update, admins delete.
    /// Navigation and SEO settings are admin-only for writes. Machines read,
    /// create and update within their own tenant but never delete.
    pub fn for_collection(collection: Collection) -> Self {
        let writers: &[TenantRole] = match collection {
            Collection::Navigation | Collection::Seo => &[TenantRole::Admin],
            _ => &[TenantRole::Admin, TenantRole::Editor],
        };

        Self::builder(collection)
            .rule(Operation::Read, &TenantRole::ALL, true)
            .rule(Operation::Create, writers, true)
            .rule(Operation::Update, writers, true)
            .rule(Operation::Delete, &[TenantRole::Admin], false)
            .public_read(true)
            .build()
    }

    /// Creates a builder with no rules; unset operations are denied to all
    /// but system users.
    pub fn builder(collection: Collection) -> CollectionAccessBuilder {
        CollectionAccessBuilder {
            collection,
            rules: HashMap::new(),
            public_read: false,
        }
    }

    /// The collection these rules belong to.
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Returns the rule for an operation.
    pub fn rule(&self, operation: Operation) -> OperationRule {
        self.rules
            .get(&operation)
            .cloned()
            .unwrap_or_else(OperationRule::nobody)
    }

    /// Returns `true` if anonymous visitors may read published documents of
    /// the tenant the request resolved to.
    pub fn is_public_read(&self) -> bool {
        self.public_read
    }

    /// Boolean access check against a single document.
    pub fn can_access_document(
        &self,
        actor: &Actor,
        operation: Operation,
        document_tenant: Option<TenantId>,
    ) -> bool {
        let rule = self.rule(operation);
        if matches!(actor, Actor::TenantMachine { .. }) && !rule.machines {
            return false;
        }
        evaluate_document_access(actor, &rule.roles, document_tenant)
    }

    /// Query-level access for listing documents.
    pub fn list_access(&self, actor: &Actor) -> ListAccess {
        let rule = self.rule(Operation::Read);
        if matches!(actor, Actor::TenantMachine { .. }) && !rule.machines {
            return ListAccess::Denied;
        }
        build_list_filter(actor, &rule.roles)
    }

    /// Query-level access for anonymous visitors of a tenant site:
    /// published documents of `site_tenant` only.
    pub fn public_list_access(&self, site_tenant: Option<TenantId>) -> ListAccess {
        match site_tenant {
            Some(tenant) if self.public_read => {
                ListAccess::Filtered(Where::tenant_equals(tenant).and(Where::published()))
            }
            _ => ListAccess::Denied,
        }
    }
}

/// Builder for [`CollectionAccess`].
pub struct CollectionAccessBuilder {
    collection: Collection,
    rules: HashMap<Operation, OperationRule>,
    public_read: bool,
}

impl CollectionAccessBuilder {
    /// Sets the rule for an operation.
    pub fn rule(mut self, operation: Operation, roles: &[TenantRole], machines: bool) -> Self {
        self.rules.insert(operation, OperationRule::new(roles, machines));
        self
    }

    /// Sets whether anonymous visitors may read published documents.
    pub fn public_read(mut self, public: bool) -> Self {
        self.public_read = public;
        self
    }

    /// Builds the rules.
    pub fn build(self) -> CollectionAccess {
        CollectionAccess {
            collection: self.collection,
            rules: self.rules,
            public_read: self.public_read,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::User;
    use serde_json::json;

    fn member(tenant: i64, role: TenantRole) -> Actor {
        Actor::from_user(User::new("u", "u@example.com").with_membership(tenant, role))
    }

    #[test]
    fn test_default_rules() {
        let pages = CollectionAccess::for_collection(Collection::Pages);
        let viewer = member(7, TenantRole::Viewer);
        let editor = member(7, TenantRole::Editor);
        let admin = member(7, TenantRole::Admin);
        let t7 = Some(TenantId::new(7));

        assert!(pages.can_access_document(&viewer, Operation::Read, t7));
        assert!(!pages.can_access_document(&viewer, Operation::Update, t7));
        assert!(pages.can_access_document(&editor, Operation::Create, t7));
        assert!(!pages.can_access_document(&editor, Operation::Delete, t7));
        assert!(pages.can_access_document(&admin, Operation::Delete, t7));
    }

    #[test]
    fn test_navigation_writes_admin_only() {
        let nav = CollectionAccess::for_collection(Collection::Navigation);
        let editor = member(7, TenantRole::Editor);
        assert!(!nav.can_access_document(&editor, Operation::Update, Some(TenantId::new(7))));
        assert!(nav.can_access_document(&editor, Operation::Read, Some(TenantId::new(7))));
    }

    #[test]
    fn test_machine_cannot_delete() {
        let posts = CollectionAccess::for_collection(Collection::Posts);
        let machine = Actor::machine(99);
        assert!(posts.can_access_document(&machine, Operation::Update, Some(TenantId::new(99))));
        assert!(!posts.can_access_document(&machine, Operation::Delete, Some(TenantId::new(99))));
    }

    #[test]
    fn test_unset_operation_denied() {
        let locked = CollectionAccess::builder(Collection::Seo).build();
        let admin = member(7, TenantRole::Admin);
        assert!(!locked.can_access_document(&admin, Operation::Read, Some(TenantId::new(7))));
        assert!(locked.list_access(&admin).is_denied());
        assert!(locked.list_access(&Actor::machine(7)).is_denied());

        let system = Actor::from_user(User::new("root", "root@example.com").as_system_user());
        assert!(locked.can_access_document(&system, Operation::Delete, None));
    }

    #[test]
    fn test_public_list_access() {
        let pages = CollectionAccess::for_collection(Collection::Pages);
        assert!(pages.public_list_access(None).is_denied());
        assert_eq!(
            serde_json::to_value(pages.public_list_access(Some(TenantId::new(3)))).unwrap(),
            json!({"and": [{"tenant": {"equals": 3}}, {"_published": {"equals": true}}]})
        );

        let private = CollectionAccess::builder(Collection::Media).build();
        assert!(private.public_list_access(Some(TenantId::new(3))).is_denied());
    }
}
