use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::document::{parse_document, to_document};
use super::{CollectionPath, DocumentStore, MAX_DELETE_BATCH};
use crate::error::{AppError, AppResult};
use crate::models::entry::JournalEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "asc")]
    Ascending,
    #[default]
    #[serde(alias = "desc")]
    Descending,
}

/// Per-user journal entries on top of a [`DocumentStore`].
#[derive(Clone)]
pub struct EntryStore {
    docs: Arc<dyn DocumentStore>,
    batch_size: usize,
}

impl EntryStore {
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs,
            batch_size: MAX_DELETE_BATCH,
        }
    }

    /// Clamped to `1..=MAX_DELETE_BATCH`.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_DELETE_BATCH);
        self
    }

    /// Upserts `entry` at `users/{user_id}/journalEntries/{id}`, generating
    /// an id when the entry has none. Returns the entry as stored.
    pub async fn save(&self, entry: &JournalEntry, user_id: &str) -> AppResult<JournalEntry> {
        let id = entry
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let path = CollectionPath::journal_entries(user_id)?.doc(&id)?;

        self.docs
            .set(&path, to_document(entry, &id, user_id))
            .await?;

        tracing::debug!(user_id = %user_id, entry_id = %id, "Saved journal entry");

        Ok(JournalEntry {
            id: Some(id),
            user_id: user_id.to_string(),
            ..entry.clone()
        })
    }

    /// All of the user's entries. Documents that fail to parse are skipped.
    /// `None` keeps the store's native (document id) order.
    pub async fn fetch_all(
        &self,
        user_id: &str,
        order: Option<SortOrder>,
    ) -> AppResult<Vec<JournalEntry>> {
        let collection = CollectionPath::journal_entries(user_id)?;
        let documents = self.docs.list(&collection).await?;

        let mut skipped = 0usize;
        let mut entries: Vec<JournalEntry> = documents
            .iter()
            .filter_map(|(path, data)| match parse_document(path.id(), data) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(path = %path, error = %e, "Skipping malformed journal entry");
                    None
                }
            })
            .collect();

        match order {
            Some(SortOrder::Ascending) => entries.sort_by_key(|e| e.timestamp),
            Some(SortOrder::Descending) => {
                entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp))
            }
            None => {}
        }

        tracing::debug!(
            user_id = %user_id,
            count = entries.len(),
            skipped,
            "Fetched journal entries"
        );

        Ok(entries)
    }

    pub async fn fetch_one(&self, entry_id: &str, user_id: &str) -> AppResult<JournalEntry> {
        let path = CollectionPath::journal_entries(user_id)?.doc(entry_id)?;
        let data = self
            .docs
            .get(&path)
            .await?
            .ok_or_else(|| AppError::EntryNotFound(entry_id.to_string()))?;

        parse_document(entry_id, &data)
            .map_err(|e| AppError::MalformedEntry(format!("{entry_id}: {e}")))
    }

    /// Idempotent: deleting an absent entry succeeds.
    pub async fn delete(&self, entry_id: &str, user_id: &str) -> AppResult<()> {
        let path = CollectionPath::journal_entries(user_id)?.doc(entry_id)?;
        self.docs.delete(&path).await?;
        tracing::debug!(user_id = %user_id, entry_id = %entry_id, "Deleted journal entry");
        Ok(())
    }

    /// Deletes every entry of the user in sequential batches of at most
    /// `batch_size`. A failed batch stops the run; batches already committed
    /// stay deleted. Returns the number of documents deleted.
    pub async fn delete_all(&self, user_id: &str) -> AppResult<usize> {
        let collection = CollectionPath::journal_entries(user_id)?;
        let paths: Vec<_> = self
            .docs
            .list(&collection)
            .await?
            .into_iter()
            .map(|(path, _)| path)
            .collect();

        let mut deleted = 0usize;
        for (batch_no, batch) in paths.chunks(self.batch_size).enumerate() {
            if let Err(e) = self.docs.delete_batch(batch).await {
                tracing::warn!(
                    user_id = %user_id,
                    committed_batches = batch_no,
                    deleted,
                    remaining = paths.len() - deleted,
                    error = %e,
                    "Bulk delete stopped part way; committed batches are not rolled back"
                );
                return Err(e);
            }
            deleted += batch.len();
        }

        tracing::info!(
            user_id = %user_id,
            deleted,
            batches = paths.len().div_ceil(self.batch_size),
            "Deleted all journal entries"
        );

        Ok(deleted)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.docs.ping().await
    }
}
