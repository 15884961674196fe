//! Tenant identifier type.
//!
//! This module defines the [`TenantId`] type, the numeric identifier that
//! every tenant-owned record (users' memberships, documents, domains) refers to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A tenant identifier.
///
/// Tenant identifiers are assigned by storage and are opaque to the access
/// layer: two identifiers are either equal or they are not. A machine actor
/// authenticated with a tenant's API key carries exactly this identifier.
///
/// # Examples
///
/// ```
/// use meridian_tenancy::tenant::TenantId;
///
/// let tenant = TenantId::new(42);
/// assert_eq!(tenant.get(), 42);
/// assert_eq!(tenant.to_string(), "42");
/// assert_eq!("42".parse::<TenantId>().unwrap(), tenant);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(i64);

impl TenantId {
    /// Creates a new tenant ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TenantId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<TenantId> for i64 {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

/// Error returned when a string is not a valid tenant identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tenant id: {0:?}")]
pub struct ParseTenantIdError(pub String);

impl FromStr for TenantId {
    type Err = ParseTenantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(TenantId)
            .map_err(|_| ParseTenantIdError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = TenantId::new(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(" 7 ".parse::<TenantId>().unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("acme".parse::<TenantId>().is_err());
        assert!("".parse::<TenantId>().is_err());
        assert!("7.5".parse::<TenantId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = TenantId::new(99);
        assert_eq!(serde_json::to_string(&id).unwrap(), "99");
        let back: TenantId = serde_json::from_str("99").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ordering() {
        assert!(TenantId::new(1) < TenantId::new(2));
    }
}
