//! Content collections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A tenant-owned content collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    /// Site pages built from blocks.
    Pages,
    /// Blog posts.
    Posts,
    /// Post tags.
    Tags,
    /// Uploaded media metadata.
    Media,
    /// Blocks shared between pages.
    ReusableContent,
    /// Header and footer navigation.
    Navigation,
    /// Site-wide SEO defaults.
    Seo,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Collection; 7] = [
        Collection::Pages,
        Collection::Posts,
        Collection::Tags,
        Collection::Media,
        Collection::ReusableContent,
        Collection::Navigation,
        Collection::Seo,
    ];

    /// URL slug of the collection.
    pub fn slug(&self) -> &'static str {
        match self {
            Collection::Pages => "pages",
            Collection::Posts => "posts",
            Collection::Tags => "tags",
            Collection::Media => "media",
            Collection::ReusableContent => "reusable-content",
            Collection::Navigation => "navigation",
            Collection::Seo => "seo",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Collection {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| crate::error::ValidationError::UnknownCollection {
                collection: s.to_string(),
            })
    }
}
