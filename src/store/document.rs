//! Wire schema of a journal entry document.
//!
//! Field names are the camelCase keys the mobile clients write. Optional
//! fields are omitted rather than stored as `null`.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::models::entry::{Coordinate, JournalEntry, MAX_RATING, MIN_RATING};
use crate::models::mood::MoodCategory;

pub const ID: &str = "id";
pub const USER_ID: &str = "userID";
pub const MOOD_TITLE: &str = "moodTitle";
pub const MOOD_RATING: &str = "moodRating";
pub const ENTRY_THOUGHTS: &str = "entryThoughts";
pub const MOOD_CATEGORY: &str = "moodCategory";
pub const EMOJI: &str = "emoji";
pub const TIMESTAMP: &str = "timestamp";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

/// Older clients wrote the timestamp under this key.
const LEGACY_TIMESTAMP: &str = "dateOfEntry";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("document is not an object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("field `{0}` has the wrong type")]
    Mistyped(&'static str),
    #[error("moodRating {0} is outside 1..=10")]
    RatingOutOfRange(i64),
}

pub fn to_document(entry: &JournalEntry, id: &str, user_id: &str) -> Value {
    let mut doc = Map::new();
    doc.insert(ID.into(), Value::from(id));
    doc.insert(USER_ID.into(), Value::from(user_id));
    doc.insert(MOOD_TITLE.into(), Value::from(entry.mood_title.as_str()));
    doc.insert(MOOD_RATING.into(), Value::from(entry.mood_rating));
    doc.insert(ENTRY_THOUGHTS.into(), Value::from(entry.entry_thoughts.as_str()));
    doc.insert(MOOD_CATEGORY.into(), Value::from(entry.mood_category.key()));
    doc.insert(EMOJI.into(), Value::from(entry.mood_category.emoji()));
    doc.insert(
        TIMESTAMP.into(),
        Value::from(entry.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    );
    if let Some(location) = entry.location {
        doc.insert(LATITUDE.into(), Value::from(location.latitude));
        doc.insert(LONGITUDE.into(), Value::from(location.longitude));
    }
    Value::Object(doc)
}

/// Parses a stored document. `doc_id` is the last segment of the document's
/// path and stands in for a missing `id` field.
pub fn parse_document(doc_id: &str, value: &Value) -> Result<JournalEntry, DocumentError> {
    let obj = value.as_object().ok_or(DocumentError::NotAnObject)?;

    let id = match obj.get(ID) {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => doc_id.to_string(),
    };

    let rating = integer_field(obj, MOOD_RATING)?;
    if !(MIN_RATING as i64..=MAX_RATING as i64).contains(&rating) {
        return Err(DocumentError::RatingOutOfRange(rating));
    }

    let location = Coordinate::from_parts(
        optional_number(obj, LATITUDE)?,
        optional_number(obj, LONGITUDE)?,
    );
    if location.is_none() && (obj.contains_key(LATITUDE) || obj.contains_key(LONGITUDE)) {
        tracing::debug!(entry_id = %id, "Dropping half-present coordinate");
    }

    Ok(JournalEntry {
        id: Some(id),
        user_id: string_field(obj, USER_ID)?,
        mood_title: string_field(obj, MOOD_TITLE)?,
        mood_rating: rating as i32,
        entry_thoughts: string_field(obj, ENTRY_THOUGHTS)?,
        mood_category: category_field(obj)?,
        timestamp: timestamp_field(obj)?,
        location,
    })
}

fn string_field(obj: &Map<String, Value>, key: &'static str) -> Result<String, DocumentError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DocumentError::Missing(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DocumentError::Mistyped(key)),
    }
}

fn integer_field(obj: &Map<String, Value>, key: &'static str) -> Result<i64, DocumentError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DocumentError::Missing(key)),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or(DocumentError::Mistyped(key)),
        Some(_) => Err(DocumentError::Mistyped(key)),
    }
}

fn optional_number(obj: &Map<String, Value>, key: &'static str) -> Result<Option<f64>, DocumentError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or(DocumentError::Mistyped(key)),
        Some(_) => Err(DocumentError::Mistyped(key)),
    }
}

fn category_field(obj: &Map<String, Value>) -> Result<MoodCategory, DocumentError> {
    if let Some(value) = obj.get(MOOD_CATEGORY).filter(|v| !v.is_null()) {
        return value
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or(DocumentError::Mistyped(MOOD_CATEGORY));
    }
    match obj.get(EMOJI) {
        None | Some(Value::Null) => Err(DocumentError::Missing(MOOD_CATEGORY)),
        Some(Value::String(glyph)) => {
            MoodCategory::from_emoji(glyph).ok_or(DocumentError::Mistyped(EMOJI))
        }
        Some(_) => Err(DocumentError::Mistyped(EMOJI)),
    }
}

fn timestamp_field(obj: &Map<String, Value>) -> Result<DateTime<Utc>, DocumentError> {
    let (key, value) = match (obj.get(TIMESTAMP), obj.get(LEGACY_TIMESTAMP)) {
        (Some(v), _) if !v.is_null() => (TIMESTAMP, v),
        (_, Some(v)) if !v.is_null() => (LEGACY_TIMESTAMP, v),
        _ => return Err(DocumentError::Missing(TIMESTAMP)),
    };

    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| DocumentError::Mistyped(key)),
        // Exported store timestamps: {"seconds": .., "nanoseconds": ..}
        Value::Object(ts) => {
            let seconds = ts
                .get("seconds")
                .and_then(Value::as_i64)
                .ok_or(DocumentError::Mistyped(key))?;
            let nanos = ts.get("nanoseconds").and_then(Value::as_u64).unwrap_or(0);
            u32::try_from(nanos)
                .ok()
                .and_then(|nanos| Utc.timestamp_opt(seconds, nanos).single())
                .ok_or(DocumentError::Mistyped(key))
        }
        _ => Err(DocumentError::Mistyped(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> JournalEntry {
        JournalEntry {
            id: Some("e1".into()),
            user_id: "u1".into(),
            mood_title: "Sunny walk".into(),
            mood_rating: 8,
            entry_thoughts: "Went to the park.".into(),
            mood_category: MoodCategory::Joyful,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 10, 8, 30, 15).unwrap()
                + chrono::Duration::microseconds(1234),
            location: None,
        }
    }

    fn valid_doc() -> Value {
        json!({
            "id": "e1",
            "userID": "u1",
            "moodTitle": "t",
            "moodRating": 5,
            "entryThoughts": "",
            "moodCategory": "sad",
            "timestamp": "2026-02-10T08:30:00Z",
        })
    }

    // ── Writing ──────────────────────────────────────────────────────────

    #[test]
    fn test_absent_location_is_not_written() {
        let doc = to_document(&sample_entry(), "e1", "u1");
        let obj = doc.as_object().unwrap();
        assert!(!obj.contains_key(LATITUDE));
        assert!(!obj.contains_key(LONGITUDE));
        assert_eq!(obj[MOOD_CATEGORY], "joyful");
        assert_eq!(obj[EMOJI], "😄");
    }

    #[test]
    fn test_written_document_parses_back_to_same_entry() {
        let mut entry = sample_entry();
        entry.location = Some(Coordinate::new(40.7128, -74.006));
        let doc = to_document(&entry, "e1", "u1");
        assert_eq!(parse_document("e1", &doc).unwrap(), entry);
    }

    // ── Required fields ──────────────────────────────────────────────────

    #[test]
    fn test_each_required_field_is_enforced() {
        for key in [USER_ID, MOOD_TITLE, MOOD_RATING, ENTRY_THOUGHTS, MOOD_CATEGORY, TIMESTAMP] {
            let mut doc = valid_doc();
            doc.as_object_mut().unwrap().remove(key);
            let err = parse_document("e1", &doc).unwrap_err();
            assert_eq!(err, DocumentError::Missing(key), "removing {key}");
        }
    }

    #[test]
    fn test_mistyped_fields() {
        let mut doc = valid_doc();
        doc[MOOD_RATING] = json!("five");
        assert_eq!(
            parse_document("e1", &doc).unwrap_err(),
            DocumentError::Mistyped(MOOD_RATING)
        );

        let mut doc = valid_doc();
        doc[MOOD_CATEGORY] = json!("ecstatic");
        assert_eq!(
            parse_document("e1", &doc).unwrap_err(),
            DocumentError::Mistyped(MOOD_CATEGORY)
        );

        assert_eq!(
            parse_document("e1", &json!([1, 2])).unwrap_err(),
            DocumentError::NotAnObject
        );
    }

    #[test]
    fn test_rating_out_of_range_is_malformed() {
        let mut doc = valid_doc();
        doc[MOOD_RATING] = json!(11);
        assert_eq!(
            parse_document("e1", &doc).unwrap_err(),
            DocumentError::RatingOutOfRange(11)
        );
    }

    // ── Legacy shapes ────────────────────────────────────────────────────

    #[test]
    fn test_legacy_emoji_and_date_of_entry() {
        let doc = json!({
            "userID": "u1",
            "moodTitle": "t",
            "moodRating": 7.0,
            "entryThoughts": "x",
            "emoji": "😴",
            "dateOfEntry": { "seconds": 1770712200, "nanoseconds": 0 },
        });
        let entry = parse_document("from-path", &doc).unwrap();
        assert_eq!(entry.id.as_deref(), Some("from-path"));
        assert_eq!(entry.mood_category, MoodCategory::Tired);
        assert_eq!(entry.mood_rating, 7);
        assert_eq!(entry.timestamp.timestamp(), 1770712200);
    }

    #[test]
    fn test_half_present_coordinate_is_dropped() {
        let mut doc = valid_doc();
        doc[LATITUDE] = json!(12.5);
        let entry = parse_document("e1", &doc).unwrap();
        assert!(entry.location.is_none());
    }
}
