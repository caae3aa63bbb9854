//! # MoodMap: Request/Response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::entry::{Coordinate, EntryDraft, JournalEntry, LocationProvider};
use crate::models::mood::MoodCategory;
use crate::store::SortOrder;

// ============================================================================
// Entries
// ============================================================================

/// POST /api/entries
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_entry_request"))]
pub struct CreateEntryRequest {
    /// Client-generated id. Re-posting the same id overwrites that entry.
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,

    #[validate(length(max = 50, message = "Mood title must be at most 50 characters"))]
    #[serde(default)]
    pub mood_title: String,

    #[validate(range(min = 1, max = 10, message = "Mood rating must be between 1 and 10"))]
    pub mood_rating: i32,

    #[serde(default)]
    pub entry_thoughts: String,

    pub mood_category: MoodCategory,

    /// Defaults to the time the request is handled.
    pub timestamp: Option<DateTime<Utc>>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Ids that collide with static routes under `/api/entries/`.
const RESERVED_ENTRY_IDS: &[&str] = &["map"];

fn validate_entry_request(req: &CreateEntryRequest) -> Result<(), ValidationError> {
    if req
        .id
        .as_deref()
        .is_some_and(|id| RESERVED_ENTRY_IDS.contains(&id))
    {
        return Err(ValidationError::new("entry_id_is_reserved"));
    }
    if req.latitude.is_some() != req.longitude.is_some() {
        return Err(ValidationError::new(
            "latitude_and_longitude_must_be_given_together",
        ));
    }
    Ok(())
}

impl LocationProvider for CreateEntryRequest {
    fn last_known_coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

impl CreateEntryRequest {
    pub fn into_entry(self, now: DateTime<Utc>) -> JournalEntry {
        let mut entry = EntryDraft::new(
            self.mood_title.clone(),
            self.mood_rating,
            self.entry_thoughts.clone(),
            self.mood_category,
        )
        .into_entry(&self, now);

        if let Some(id) = self.id {
            entry.id = Some(id);
        }
        if let Some(timestamp) = self.timestamp {
            entry.timestamp = timestamp;
        }
        entry
    }
}

/// GET /api/entries
#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesQuery {
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub deleted: usize,
}

// ============================================================================
// Analytics
// ============================================================================

/// GET /api/analytics
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AnalyticsQuery {
    /// Caller's UTC offset; defaults to the server's local offset.
    #[validate(range(min = -1080, max = 1080))]
    pub tz_offset_minutes: Option<i32>,

    #[validate(range(min = 1, max = 3650))]
    pub window_days: Option<i64>,
}
