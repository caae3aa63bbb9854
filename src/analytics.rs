//! Mood analytics over an entry collection.
//!
//! Everything here is a pure function of its inputs. Functions that depend
//! on "now" or on calendar days take the reference instant explicitly; the
//! time zone of that instant decides where one day ends and the next begins.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::entry::{Coordinate, JournalEntry};
use crate::models::mood::MoodCategory;

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Day streaks relative to the local clock.
pub fn compute_streaks(entries: &[JournalEntry]) -> Streaks {
    compute_streaks_at(entries, Local::now())
}

/// Day streaks relative to `now`, bucketing entries into calendar days of
/// `now`'s time zone.
///
/// `current` counts back from the most recent day with an entry, provided
/// that day is today or yesterday; otherwise the streak is broken and
/// `current` is 0. Several entries on one day count as one day, and entries
/// dated after today count as today.
pub fn compute_streaks_at<Tz: TimeZone>(entries: &[JournalEntry], now: DateTime<Tz>) -> Streaks {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut days: Vec<NaiveDate> = entries
        .iter()
        .map(|e| e.timestamp.with_timezone(&tz).date_naive().min(today))
        .collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let Some(&most_recent) = days.first() else {
        return Streaks::default();
    };

    let consecutive = |pair: &[NaiveDate]| (pair[0] - pair[1]).num_days() == 1;

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in days.windows(2) {
        run = if consecutive(pair) { run + 1 } else { 1 };
        longest = longest.max(run);
    }

    let current = if (today - most_recent).num_days() <= 1 {
        1 + days.windows(2).take_while(|pair| consecutive(pair)).count() as u32
    } else {
        0
    };

    Streaks { current, longest }
}

/// Entries per mood. `None` when there are no entries at all.
pub fn mood_distribution(entries: &[JournalEntry]) -> Option<BTreeMap<MoodCategory, usize>> {
    if entries.is_empty() {
        return None;
    }
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.mood_category).or_insert(0) += 1;
    }
    Some(counts)
}

/// The mood ring: share of entries per mood, in percent.
pub fn mood_percentages(entries: &[JournalEntry]) -> Option<BTreeMap<MoodCategory, f64>> {
    let total = entries.len() as f64;
    mood_distribution(entries).map(|counts| {
        counts
            .into_iter()
            .map(|(mood, count)| (mood, count as f64 / total * 100.0))
            .collect()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MostCommonMood {
    pub category: MoodCategory,
    pub percentage: f64,
}

/// The mood with the most entries. Ties go to the mood of the most recently
/// dated entry among the tied moods.
pub fn most_common_category(entries: &[JournalEntry]) -> Option<MostCommonMood> {
    let counts = mood_distribution(entries)?;
    let max_count = counts.values().copied().max()?;

    let category = entries
        .iter()
        .filter(|e| counts.get(&e.mood_category) == Some(&max_count))
        .max_by_key(|e| e.timestamp)?
        .mood_category;

    Some(MostCommonMood {
        category,
        percentage: max_count as f64 / entries.len() as f64 * 100.0,
    })
}

/// Entries stamped at or after `reference_now - n days`.
///
/// A window of `n <= 0` days is empty. A window reaching past the earliest
/// representable instant keeps every entry.
pub fn filter_within_last_n_days(
    entries: &[JournalEntry],
    n: i64,
    reference_now: DateTime<Utc>,
) -> Vec<JournalEntry> {
    if n <= 0 {
        return Vec::new();
    }
    let Some(cutoff) = Duration::try_days(n).and_then(|d| reference_now.checked_sub_signed(d))
    else {
        return entries.to_vec();
    };
    entries
        .iter()
        .filter(|e| e.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Mean rating; 0.0 for an empty collection.
pub fn average_rating(entries: &[JournalEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let total: i64 = entries.iter().map(|e| i64::from(e.mood_rating)).sum();
    total as f64 / entries.len() as f64
}

pub fn rolling_average(entries: &[JournalEntry], window_days: i64, now: DateTime<Utc>) -> f64 {
    average_rating(&filter_within_last_n_days(entries, window_days, now))
}

/// How often each rating was given inside the window.
pub fn rating_counts(
    entries: &[JournalEntry],
    window_days: i64,
    now: DateTime<Utc>,
) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for entry in filter_within_last_n_days(entries, window_days, now) {
        *counts.entry(entry.mood_rating).or_insert(0) += 1;
    }
    counts
}

/// Total number of entries ever logged.
pub fn mood_score(entries: &[JournalEntry]) -> usize {
    entries.len()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodPin {
    pub entry_id: Option<String>,
    pub coordinate: Coordinate,
    pub mood_category: MoodCategory,
    pub emoji: &'static str,
    pub mood_title: String,
    pub mood_rating: i32,
    pub timestamp: DateTime<Utc>,
}

/// One pin per entry that was recorded with a location.
pub fn map_pins(entries: &[JournalEntry]) -> Vec<MoodPin> {
    entries
        .iter()
        .filter_map(|e| {
            e.location.map(|coordinate| MoodPin {
                entry_id: e.id.clone(),
                coordinate,
                mood_category: e.mood_category,
                emoji: e.emoji(),
                mood_title: e.mood_title.clone(),
                mood_rating: e.mood_rating,
                timestamp: e.timestamp,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodShare {
    pub category: MoodCategory,
    pub emoji: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

/// Everything the mood swings screen shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSummary {
    pub streaks: Streaks,
    pub mood_score: usize,
    /// Empty when there are no entries.
    pub mood_ring: Vec<MoodShare>,
    pub most_common: Option<MostCommonMood>,
    pub window_days: i64,
    pub window_entries: usize,
    pub rolling_average: f64,
    pub rating_counts: BTreeMap<i32, usize>,
}

impl MoodSummary {
    pub fn compute<Tz: TimeZone>(
        entries: &[JournalEntry],
        now: DateTime<Tz>,
        window_days: i64,
    ) -> Self {
        let now_utc = now.with_timezone(&Utc);
        let window = filter_within_last_n_days(entries, window_days, now_utc);
        let total = entries.len() as f64;

        let mood_ring = mood_distribution(entries)
            .unwrap_or_default()
            .into_iter()
            .map(|(category, count)| MoodShare {
                category,
                emoji: category.emoji(),
                label: category.label(),
                count,
                percentage: count as f64 / total * 100.0,
            })
            .collect();

        Self {
            streaks: compute_streaks_at(entries, now),
            mood_score: mood_score(entries),
            mood_ring,
            most_common: most_common_category(entries),
            window_days,
            window_entries: window.len(),
            rolling_average: average_rating(&window),
            rating_counts: rating_counts(entries, window_days, now_utc),
        }
    }
}
