//! Per-tenant roles and memberships.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::TenantId;

/// A role a user holds within a single tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantRole {
    /// Manages the tenant's users, domains and all of its content.
    Admin,
    /// Creates and edits the tenant's content.
    Editor,
    /// Reads the tenant's unpublished content in the admin UI.
    Viewer,
}

impl TenantRole {
    /// All roles, highest privilege first.
    pub const ALL: [TenantRole; 3] = [TenantRole::Admin, TenantRole::Editor, TenantRole::Viewer];

    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantRole::Admin => "admin",
            TenantRole::Editor => "editor",
            TenantRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for TenantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tenant role: {0:?}")]
pub struct ParseRoleError(pub String);

impl FromStr for TenantRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(TenantRole::Admin),
            "editor" => Ok(TenantRole::Editor),
            "viewer" => Ok(TenantRole::Viewer),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// A `(tenant, role)` pair granting a user a role inside one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantMembership {
    /// The tenant the role applies to.
    pub tenant: TenantId,
    /// The role held inside that tenant.
    pub role: TenantRole,
}

impl TenantMembership {
    /// Creates a membership.
    pub fn new(tenant: impl Into<TenantId>, role: TenantRole) -> Self {
        Self {
            tenant: tenant.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in TenantRole::ALL {
            assert_eq!(role.as_str().parse::<TenantRole>().unwrap(), role);
        }
        assert_eq!("ADMIN".parse::<TenantRole>().unwrap(), TenantRole::Admin);
        assert!("owner".parse::<TenantRole>().is_err());
    }

    #[test]
    fn test_membership_wire_shape() {
        let m = TenantMembership::new(7, TenantRole::Admin);
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json, serde_json::json!({"tenant": 7, "role": "admin"}));
    }
}
