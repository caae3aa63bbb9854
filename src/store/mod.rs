//! # Journal persistence
//!
//! Two layers:
//! - [`DocumentStore`] is the raw backend: JSON documents addressed by
//!   slash-separated paths, grouped into collections. Postgres in production,
//!   an in-process map for tests and local runs.
//! - [`EntryStore`] translates [`JournalEntry`](crate::models::entry::JournalEntry)
//!   records to and from documents under `users/{userID}/journalEntries`.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::error::{AppError, AppResult};

pub mod document;
pub mod entries;
pub mod memory;
pub mod postgres;

pub use entries::{EntryStore, SortOrder};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Upper bound on delete operations committed together by `delete_all`.
pub const MAX_DELETE_BATCH: usize = 400;

const USERS: &str = "users";
const JOURNAL_ENTRIES: &str = "journalEntries";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// `users/{user_id}/journalEntries`
    pub fn journal_entries(user_id: &str) -> AppResult<Self> {
        check_segment("user id", user_id)?;
        Ok(Self(format!("{USERS}/{user_id}/{JOURNAL_ENTRIES}")))
    }

    pub fn doc(&self, id: &str) -> AppResult<DocumentPath> {
        check_segment("entry id", id)?;
        Ok(DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Path segments cannot be empty or contain `/`, otherwise one user's id
/// could address another user's namespace.
fn check_segment(what: &str, segment: &str) -> AppResult<()> {
    if segment.is_empty() || segment.contains('/') {
        return Err(AppError::Validation(format!(
            "{what} must be a non-empty path segment without '/'"
        )));
    }
    Ok(())
}

/// Raw document backend. Writes are last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or overwrite the document at `path`.
    async fn set(&self, path: &DocumentPath, data: Value) -> AppResult<()>;

    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Value>>;

    /// Succeeds when the document is already gone.
    async fn delete(&self, path: &DocumentPath) -> AppResult<()>;

    /// Every document in the collection, ordered by document id.
    async fn list(&self, collection: &CollectionPath) -> AppResult<Vec<(DocumentPath, Value)>>;

    /// Deletes all `paths` in a single commit: either all of them go or none do.
    async fn delete_batch(&self, paths: &[DocumentPath]) -> AppResult<()>;

    async fn ping(&self) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_users_namespace() {
        let collection = CollectionPath::journal_entries("u1").unwrap();
        assert_eq!(collection.as_str(), "users/u1/journalEntries");
        let doc = collection.doc("e1").unwrap();
        assert_eq!(doc.to_string(), "users/u1/journalEntries/e1");
        assert_eq!(doc.id(), "e1");
        assert_eq!(doc.collection(), &collection);
    }

    #[test]
    fn test_segments_cannot_escape_namespace() {
        assert!(CollectionPath::journal_entries("").is_err());
        assert!(CollectionPath::journal_entries("u1/journalEntries/x").is_err());
        let collection = CollectionPath::journal_entries("u1").unwrap();
        assert!(collection.doc("").is_err());
        assert!(collection.doc("../u2").is_err());
    }
}
