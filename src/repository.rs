//! In-memory view of the signed-in user's journal.
//!
//! `EntryRepository` is the only writer of its entry list. Every operation
//! takes the repository's operation lock for its whole duration (store call
//! plus the reload that follows), so intents issued concurrently take effect
//! one at a time and in the order they acquired the lock. Readers never wait:
//! `entries()`, `is_loading()` and `subscribe()` read a `watch` channel.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::error::{AppError, AppResult};
use crate::models::entry::JournalEntry;
use crate::store::{EntryStore, SortOrder};

/// Answers "who is signed in right now".
pub trait SessionProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

impl SessionProvider for Option<String> {
    fn current_user_id(&self) -> Option<String> {
        self.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntriesView {
    pub entries: Vec<JournalEntry>,
    pub is_loading: bool,
}

pub struct EntryRepository {
    store: EntryStore,
    session: Arc<dyn SessionProvider>,
    view: watch::Sender<EntriesView>,
    ops: Mutex<()>,
}

/// Raises `is_loading` for its lifetime and restores the previous value on
/// drop, including on early return.
struct LoadingGuard<'a> {
    view: &'a watch::Sender<EntriesView>,
    previous: bool,
}

impl<'a> LoadingGuard<'a> {
    fn begin(view: &'a watch::Sender<EntriesView>) -> Self {
        let previous = view.borrow().is_loading;
        view.send_modify(|v| v.is_loading = true);
        Self { view, previous }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let previous = self.previous;
        self.view.send_modify(|v| v.is_loading = previous);
    }
}

impl EntryRepository {
    pub fn new(store: EntryStore, session: Arc<dyn SessionProvider>) -> Self {
        let (view, _) = watch::channel(EntriesView::default());
        Self {
            store,
            session,
            view,
            ops: Mutex::new(()),
        }
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.view.borrow().entries.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.view.borrow().is_loading
    }

    pub fn subscribe(&self) -> watch::Receiver<EntriesView> {
        self.view.subscribe()
    }

    fn require_user(&self) -> AppResult<String> {
        self.session
            .current_user_id()
            .filter(|id| !id.is_empty())
            .ok_or(AppError::NoAuthenticatedUser)
    }

    /// Replaces the entry list with the store's current contents. Failures
    /// are logged and leave the previous list in place.
    pub async fn load_entries(&self, order: SortOrder) {
        if let Err(e) = self.refresh(order).await {
            tracing::warn!(error = %e, "Failed to load journal entries");
        }
    }

    /// Same as [`load_entries`](Self::load_entries) but hands the error back.
    pub async fn refresh(&self, order: SortOrder) -> AppResult<()> {
        let user_id = self.require_user()?;
        let _op = self.ops.lock().await;
        self.reload(&user_id, order).await
    }

    pub async fn load_entry(&self, entry_id: &str) -> AppResult<JournalEntry> {
        let user_id = self.require_user()?;
        let _op = self.ops.lock().await;
        let _loading = LoadingGuard::begin(&self.view);
        self.store.fetch_one(entry_id, &user_id).await
    }

    /// Saves `draft` as the current user's entry, then reloads from the store.
    pub async fn add_entry(&self, draft: JournalEntry) -> AppResult<JournalEntry> {
        let user_id = self.require_user()?;
        let _op = self.ops.lock().await;
        let _loading = LoadingGuard::begin(&self.view);

        let entry = JournalEntry {
            user_id: user_id.clone(),
            ..draft
        };
        let saved = self.store.save(&entry, &user_id).await?;

        self.reload_logged(&user_id).await;
        Ok(saved)
    }

    pub async fn delete_entry(&self, entry: &JournalEntry) -> AppResult<()> {
        let entry_id = entry
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("entry has no id".into()))?;
        self.delete_entry_by_id(entry_id).await
    }

    pub async fn delete_entry_by_id(&self, entry_id: &str) -> AppResult<()> {
        let user_id = self.require_user()?;
        let _op = self.ops.lock().await;
        let _loading = LoadingGuard::begin(&self.view);

        self.store.delete(entry_id, &user_id).await?;

        self.reload_logged(&user_id).await;
        Ok(())
    }

    /// Removes every entry of the current user. On failure the list is
    /// reloaded, since batches committed before the failure are gone for good.
    pub async fn delete_all_for_current_user(&self) -> AppResult<usize> {
        let user_id = self.require_user()?;
        let _op = self.ops.lock().await;
        let _loading = LoadingGuard::begin(&self.view);

        match self.store.delete_all(&user_id).await {
            Ok(deleted) => {
                self.view.send_modify(|v| v.entries.clear());
                Ok(deleted)
            }
            Err(e) => {
                self.reload_logged(&user_id).await;
                Err(e)
            }
        }
    }

    async fn reload(&self, user_id: &str, order: SortOrder) -> AppResult<()> {
        let _loading = LoadingGuard::begin(&self.view);
        let entries = self.store.fetch_all(user_id, Some(order)).await?;
        self.view.send_modify(|v| v.entries = entries);
        Ok(())
    }

    async fn reload_logged(&self, user_id: &str) {
        if let Err(e) = self.reload(user_id, SortOrder::default()).await {
            tracing::warn!(user_id = %user_id, error = %e, "Reload after write failed");
        }
    }
}
