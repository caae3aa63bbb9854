use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::mood::MoodCategory;

pub const MAX_TITLE_CHARS: usize = 50;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate only when both halves are present.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Source of the device's last resolved position.
pub trait LocationProvider {
    fn last_known_coordinate(&self) -> Option<Coordinate>;
}

impl LocationProvider for Option<Coordinate> {
    fn last_known_coordinate(&self) -> Option<Coordinate> {
        *self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Option<String>,
    pub user_id: String,
    pub mood_title: String,
    pub mood_rating: i32,
    pub entry_thoughts: String,
    pub mood_category: MoodCategory,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub location: Option<Coordinate>,
}

impl JournalEntry {
    pub fn emoji(&self) -> &'static str {
        self.mood_category.emoji()
    }
}

/// What the user typed on the new-mood screen, before it becomes an entry.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub mood_title: String,
    pub mood_rating: i32,
    pub entry_thoughts: String,
    pub mood_category: MoodCategory,
}

impl EntryDraft {
    pub fn new(
        mood_title: impl Into<String>,
        mood_rating: i32,
        entry_thoughts: impl Into<String>,
        mood_category: MoodCategory,
    ) -> Self {
        Self {
            mood_title: mood_title.into(),
            mood_rating,
            entry_thoughts: entry_thoughts.into(),
            mood_category,
        }
    }

    /// Stamps a fresh id and `now`, caps the title and clamps the rating.
    ///
    /// `user_id` is left empty; the repository overwrites it with the
    /// session's user before the entry is saved.
    pub fn into_entry(self, location: &dyn LocationProvider, now: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            id: Some(Uuid::new_v4().to_string()),
            user_id: String::new(),
            mood_title: cap_title(&self.mood_title),
            mood_rating: clamp_rating(self.mood_rating),
            entry_thoughts: self.entry_thoughts,
            mood_category: self.mood_category,
            timestamp: now,
            location: location.last_known_coordinate().filter(Coordinate::is_valid),
        }
    }
}

pub fn cap_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

pub fn clamp_rating(rating: i32) -> i32 {
    rating.clamp(MIN_RATING, MAX_RATING)
}
