//! Stored content documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::collection::Collection;
use crate::tenant::TenantId;

/// A content document owned by exactly one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Identifier, unique within the collection.
    pub id: String,
    /// Collection the document belongs to.
    pub collection: Collection,
    /// Owning tenant.
    pub tenant: TenantId,
    /// Whether the document is visible on the public site.
    #[serde(rename = "_published")]
    pub published: bool,
    /// Collection-specific fields.
    pub data: Value,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a new, unpublished document with a generated ID.
    pub fn new(collection: Collection, tenant: impl Into<TenantId>, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            collection,
            tenant: tenant.into(),
            published: false,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the document ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Marks the document as published.
    pub fn published(mut self) -> Self {
        self.published = true;
        self
    }
}

/// Input for creating a document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    /// Optional caller-chosen identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Owning tenant. Required unless the caller's tenant can be inferred.
    #[serde(default)]
    pub tenant: Option<TenantId>,
    /// Publication flag.
    #[serde(default, rename = "_published")]
    pub published: bool,
    /// Collection-specific fields.
    #[serde(default)]
    pub data: Value,
}

/// Partial update of a document. The owning tenant cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPatch {
    /// New publication flag.
    #[serde(default, rename = "_published")]
    pub published: Option<bool>,
    /// Fields merged into the document's data (top-level keys replaced).
    #[serde(default)]
    pub data: Option<Value>,
}

impl DocumentPatch {
    /// Applies the patch to a document, bumping `updated_at`.
    pub fn apply(&self, doc: &mut Document) {
        if let Some(published) = self.published {
            doc.published = published;
        }
        if let Some(data) = &self.data {
            match (doc.data.as_object_mut(), data.as_object()) {
                (Some(current), Some(changes)) => {
                    for (key, value) in changes {
                        current.insert(key.clone(), value.clone());
                    }
                }
                _ => doc.data = data.clone(),
            }
        }
        doc.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_merges_top_level_keys() {
        let mut doc = Document::new(Collection::Pages, 7, json!({"title": "Home", "slug": "home"}));
        let patch = DocumentPatch {
            published: Some(true),
            data: Some(json!({"title": "Welcome"})),
        };
        patch.apply(&mut doc);
        assert!(doc.published);
        assert_eq!(doc.data, json!({"title": "Welcome", "slug": "home"}));
    }

    #[test]
    fn test_patch_replaces_non_object_data() {
        let mut doc = Document::new(Collection::Tags, 7, Value::Null);
        let patch = DocumentPatch {
            published: None,
            data: Some(json!({"name": "rust"})),
        };
        patch.apply(&mut doc);
        assert_eq!(doc.data, json!({"name": "rust"}));
        assert!(!doc.published);
    }

    #[test]
    fn test_new_document_deserializes_defaults() {
        let input: NewDocument = serde_json::from_value(json!({"data": {"title": "x"}})).unwrap();
        assert!(input.tenant.is_none());
        assert!(!input.published);
    }
}
