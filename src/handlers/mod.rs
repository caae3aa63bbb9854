pub mod analytics;
pub mod entries;
pub mod health;

use std::sync::Arc;

use crate::auth::middleware::AuthUser;
use crate::repository::EntryRepository;
use crate::AppState;

/// Repository scoped to the caller of a single request.
fn repository_for(state: &AppState, auth_user: AuthUser) -> EntryRepository {
    EntryRepository::new(state.store.clone(), Arc::new(auth_user))
}
