//! Content types shared by the access layer and storage backends.

mod collection;
mod document;
mod pagination;

pub use collection::Collection;
pub use document::{Document, DocumentPatch, NewDocument};
pub use pagination::{DEFAULT_LIMIT, MAX_LIMIT, Page, Pagination};
