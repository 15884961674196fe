//! Users and their tenant memberships.

use serde::{Deserialize, Serialize};

use super::id::TenantId;
use super::role::{TenantMembership, TenantRole};

/// A human user of the admin UI.
///
/// Users belong to tenants through [`TenantMembership`]s. A user flagged as
/// a system user is exempt from tenant scoping altogether.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Storage-assigned identifier.
    pub id: String,
    /// Login email, unique across the platform.
    pub email: String,
    /// Global role that bypasses tenant scoping.
    #[serde(default)]
    pub system_user: bool,
    /// Per-tenant roles.
    #[serde(default)]
    pub tenants: Vec<TenantMembership>,
}

impl User {
    /// Creates a user without memberships.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            system_user: false,
            tenants: Vec::new(),
        }
    }

    /// Marks the user as a system user.
    pub fn as_system_user(mut self) -> Self {
        self.system_user = true;
        self
    }

    /// Adds a membership.
    pub fn with_membership(mut self, tenant: impl Into<TenantId>, role: TenantRole) -> Self {
        self.tenants.push(TenantMembership::new(tenant, role));
        self
    }

    /// Returns every tenant the user belongs to, regardless of role,
    /// without duplicates and in membership order.
    pub fn tenant_ids(&self) -> Vec<TenantId> {
        let mut ids = Vec::with_capacity(self.tenants.len());
        for membership in &self.tenants {
            if !ids.contains(&membership.tenant) {
                ids.push(membership.tenant);
            }
        }
        ids
    }
}

/// A user together with its stored credentials.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// The user.
    pub user: User,
    /// bcrypt hash of the user's password.
    pub password_hash: String,
}
