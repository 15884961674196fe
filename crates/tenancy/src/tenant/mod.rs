//! Tenant model for the Meridian content platform.
//!
//! # Core Types
//!
//! - [`TenantId`] - Numeric tenant identifier
//! - [`Tenant`] / [`TenantDomain`] - Tenant record and the hosts routed to it
//! - [`TenantRole`] / [`TenantMembership`] - Per-tenant roles of a user
//! - [`User`] - Human user with memberships and the optional system-user role
//! - [`Actor`] - The authenticated party behind a request
//!
//! # Examples
//!
//! ```
//! use meridian_tenancy::tenant::{Actor, TenantRole, User};
//!
//! let editor = User::new("u1", "ed@acme.test").with_membership(7, TenantRole::Editor);
//! let actor = Actor::from_user(editor);
//! assert!(!actor.is_system_user());
//!
//! let machine = Actor::machine(99);
//! assert!(machine.user().is_none());
//! ```

mod actor;
mod id;
mod model;
mod role;
mod user;

pub use actor::Actor;
pub use id::{ParseTenantIdError, TenantId};
pub use model::{Tenant, TenantDomain, normalize_host};
pub use role::{ParseRoleError, TenantMembership, TenantRole};
pub use user::{User, UserRecord};
