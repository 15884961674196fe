//! Query filters produced by access predicates.
//!
//! A [`Where`] is the query-level form of an access decision: instead of a
//! yes/no answer it says *which* documents an actor may see. Its JSON form
//! follows the collection query shape:
//!
//! ```
//! use meridian_tenancy::access::Where;
//! use meridian_tenancy::tenant::TenantId;
//!
//! let filter = Where::tenant_equals(TenantId::new(99));
//! assert_eq!(
//!     serde_json::to_value(&filter).unwrap(),
//!     serde_json::json!({"tenant": {"equals": 99}}),
//! );
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::tenant::TenantId;
use crate::types::Document;

/// Field holding the owning tenant of a document.
pub const TENANT_FIELD: &str = "tenant";

/// Field holding the publication flag of a document.
pub const PUBLISHED_FIELD: &str = "_published";

/// Comparison applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value.
    Equals(Value),
    /// Field equals one of the values. An empty list matches nothing.
    In(Vec<Value>),
}

impl Condition {
    fn matches(&self, actual: &Value) -> bool {
        match self {
            Condition::Equals(expected) => expected == actual,
            Condition::In(options) => options.iter().any(|o| o == actual),
        }
    }
}

/// A document filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// Condition on one field.
    Field {
        /// Field name.
        field: String,
        /// Comparison.
        condition: Condition,
    },
    /// All sub-filters must match.
    And(Vec<Where>),
    /// At least one sub-filter must match.
    Or(Vec<Where>),
}

impl Where {
    /// `{field: {equals: value}}`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Where::Field {
            field: field.into(),
            condition: Condition::Equals(value.into()),
        }
    }

    /// `{field: {in: values}}`
    pub fn one_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Where::Field {
            field: field.into(),
            condition: Condition::In(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Documents owned by exactly this tenant.
    pub fn tenant_equals(tenant: TenantId) -> Self {
        Self::equals(TENANT_FIELD, tenant.get())
    }

    /// Documents owned by any of these tenants.
    pub fn tenant_in(tenants: &[TenantId]) -> Self {
        Self::one_of(TENANT_FIELD, tenants.iter().map(|t| t.get()))
    }

    /// Published documents only.
    pub fn published() -> Self {
        Self::equals(PUBLISHED_FIELD, true)
    }

    /// Combines two filters so both must match, flattening nested `And`s.
    pub fn and(self, other: Where) -> Self {
        let mut parts = match self {
            Where::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Where::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Where::And(parts)
    }

    /// Evaluates the filter against a document.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Where::Field { field, condition } => {
                let actual = field_value(doc, field);
                condition.matches(&actual)
            }
            Where::And(parts) => parts.iter().all(|p| p.matches(doc)),
            Where::Or(parts) => parts.iter().any(|p| p.matches(doc)),
        }
    }
}

/// Reads a filterable field from a document. Unknown fields resolve to the
/// matching top-level key of `data`, or `null`.
fn field_value(doc: &Document, field: &str) -> Value {
    match field {
        TENANT_FIELD => Value::from(doc.tenant.get()),
        PUBLISHED_FIELD => Value::Bool(doc.published),
        "id" => Value::String(doc.id.clone()),
        other => doc.data.get(other).cloned().unwrap_or(Value::Null),
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Condition::Equals(value) => map.serialize_entry("equals", value)?,
            Condition::In(values) => map.serialize_entry("in", values)?,
        }
        map.end()
    }
}

impl Serialize for Where {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Where::Field { field, condition } => map.serialize_entry(field, condition)?,
            Where::And(parts) => map.serialize_entry("and", parts)?,
            Where::Or(parts) => map.serialize_entry("or", parts)?,
        }
        map.end()
    }
}

/// Result of a list-level access check.
///
/// Serializes the way collection access results travel on the wire:
/// `true` for unrestricted, `false` for denied, or the filter itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ListAccess {
    /// Every document is visible.
    Unrestricted,
    /// Only documents matching the filter are visible.
    Filtered(Where),
    /// Nothing is visible.
    Denied,
}

impl ListAccess {
    /// Returns `true` if nothing is visible.
    pub fn is_denied(&self) -> bool {
        matches!(self, ListAccess::Denied)
    }

    /// Returns the filter, if the access is filtered.
    pub fn filter(&self) -> Option<&Where> {
        match self {
            ListAccess::Filtered(filter) => Some(filter),
            _ => None,
        }
    }

    /// Narrows the access with an additional filter.
    pub fn restrict(self, extra: Where) -> Self {
        match self {
            ListAccess::Unrestricted => ListAccess::Filtered(extra),
            ListAccess::Filtered(filter) => ListAccess::Filtered(filter.and(extra)),
            ListAccess::Denied => ListAccess::Denied,
        }
    }

    /// Returns `true` if the document is visible under this access.
    pub fn allows(&self, doc: &Document) -> bool {
        match self {
            ListAccess::Unrestricted => true,
            ListAccess::Filtered(filter) => filter.matches(doc),
            ListAccess::Denied => false,
        }
    }
}

impl Serialize for ListAccess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ListAccess::Unrestricted => serializer.serialize_bool(true),
            ListAccess::Denied => serializer.serialize_bool(false),
            ListAccess::Filtered(filter) => filter.serialize(serializer),
        }
    }
}
