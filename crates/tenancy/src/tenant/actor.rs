//! Authenticated actors.
//!
//! Every request that passes authentication is represented by an [`Actor`].
//! Access predicates match on the actor kind exhaustively instead of probing
//! which fields happen to be present.

use serde::Serialize;

use super::id::TenantId;
use super::user::User;

/// The authenticated party behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Actor {
    /// A human holding the global system-user role. Never tenant scoped.
    SystemUser(User),
    /// A human scoped by their per-tenant memberships.
    TenantUser(User),
    /// A machine client authenticated with a tenant API key. Its identity is
    /// the tenant it belongs to.
    TenantMachine {
        /// The tenant whose key was presented.
        tenant: TenantId,
    },
}

impl Actor {
    /// Classifies a loaded user.
    pub fn from_user(user: User) -> Self {
        if user.system_user {
            Actor::SystemUser(user)
        } else {
            Actor::TenantUser(user)
        }
    }

    /// Creates a machine actor for the given tenant.
    pub fn machine(tenant: impl Into<TenantId>) -> Self {
        Actor::TenantMachine {
            tenant: tenant.into(),
        }
    }

    /// Returns `true` for system users.
    pub fn is_system_user(&self) -> bool {
        matches!(self, Actor::SystemUser(_))
    }

    /// Returns the underlying user for human actors.
    pub fn user(&self) -> Option<&User> {
        match self {
            Actor::SystemUser(user) | Actor::TenantUser(user) => Some(user),
            Actor::TenantMachine { .. } => None,
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> String {
        match self {
            Actor::SystemUser(user) => format!("system-user:{}", user.id),
            Actor::TenantUser(user) => format!("user:{}", user.id),
            Actor::TenantMachine { tenant } => format!("tenant-machine:{}", tenant),
        }
    }
}
