use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use validator::Validate;

use super::repository_for;
use crate::analytics::{map_pins, MoodPin};
use crate::auth::middleware::AuthUser;
use crate::dto::{CreateEntryRequest, DeleteAllResponse, DeleteResponse, ListEntriesQuery};
use crate::error::AppResult;
use crate::models::entry::JournalEntry;
use crate::store::SortOrder;
use crate::AppState;

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListEntriesQuery>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let repo = repository_for(&state, auth_user);
    repo.refresh(query.order).await?;
    Ok(Json(repo.entries()))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<JournalEntry>)> {
    req.validate()?;

    let repo = repository_for(&state, auth_user);
    let saved = repo.add_entry(req.into_entry(Utc::now())).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<String>,
) -> AppResult<Json<JournalEntry>> {
    let repo = repository_for(&state, auth_user);
    Ok(Json(repo.load_entry(&entry_id).await?))
}

/// Idempotent: deleting an id that does not exist still succeeds.
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let repo = repository_for(&state, auth_user);
    repo.delete_entry_by_id(&entry_id).await?;

    Ok(Json(DeleteResponse {
        deleted: true,
        id: entry_id,
    }))
}

pub async fn delete_all_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<DeleteAllResponse>> {
    let repo = repository_for(&state, auth_user);
    let deleted = repo.delete_all_for_current_user().await?;
    Ok(Json(DeleteAllResponse { deleted }))
}

/// Entries that carry a location, newest first.
pub async fn map_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<MoodPin>>> {
    let repo = repository_for(&state, auth_user);
    repo.refresh(SortOrder::Descending).await?;
    Ok(Json(map_pins(&repo.entries())))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    fn body(title: &str, rating: i32, category: &str, timestamp: &str) -> Value {
        json!({
            "mood_title": title,
            "mood_rating": rating,
            "entry_thoughts": "",
            "mood_category": category,
            "timestamp": timestamp,
        })
    }

    // ── Auth ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_entries_require_bearer_token() {
        let app = TestApp::new();
        let (status, json) = app.send(Method::GET, "/api/entries", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], 401);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new();
        let (status, json) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    // ── Create / list ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let app = TestApp::new();
        for (title, ts) in [
            ("older", "2026-03-01T08:00:00Z"),
            ("newer", "2026-03-02T08:00:00Z"),
        ] {
            let (status, json) = app
                .send(
                    Method::POST,
                    "/api/entries",
                    Some("alice"),
                    Some(body(title, 7, "happy", ts)),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(json["user_id"], "alice");
            assert!(json["id"].as_str().is_some_and(|id| !id.is_empty()));
        }

        let (status, json) = app
            .send(Method::GET, "/api/entries", Some("alice"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<_> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["mood_title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, ["newer", "older"]);

        let (_, json) = app
            .send(Method::GET, "/api/entries?order=ascending", Some("alice"), None)
            .await;
        assert_eq!(json[0]["mood_title"], "older");
    }

    #[tokio::test]
    async fn test_users_do_not_see_each_others_entries() {
        let app = TestApp::new();
        app.send(
            Method::POST,
            "/api/entries",
            Some("alice"),
            Some(body("mine", 5, "calm", "2026-03-01T08:00:00Z")),
        )
        .await;

        let (status, json) = app.send(Method::GET, "/api/entries", Some("bob"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_rating() {
        let app = TestApp::new();
        let (status, _) = app
            .send(
                Method::POST,
                "/api/entries",
                Some("alice"),
                Some(body("bad", 42, "happy", "2026-03-01T08:00:00Z")),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_rejects_id_shadowed_by_route() {
        let app = TestApp::new();
        let mut req = body("pins", 5, "calm", "2026-03-01T08:00:00Z");
        req["id"] = json!("map");
        let (status, _) = app
            .send(Method::POST, "/api/entries", Some("alice"), Some(req))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, json) = app.send(Method::GET, "/api/entries", Some("alice"), None).await;
        assert_eq!(json, json!([]));
    }

    // ── Get / delete ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_missing_entry_is_not_found() {
        let app = TestApp::new();
        let (status, _) = app
            .send(Method::GET, "/api/entries/nope", Some("alice"), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let app = TestApp::new();
        let mut req = body("gone soon", 4, "sad", "2026-03-01T08:00:00Z");
        req["id"] = json!("entry-1");
        app.send(Method::POST, "/api/entries", Some("alice"), Some(req))
            .await;

        for _ in 0..2 {
            let (status, json) = app
                .send(Method::DELETE, "/api/entries/entry-1", Some("alice"), None)
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["deleted"], true);
        }

        let (status, _) = app
            .send(Method::GET, "/api/entries/entry-1", Some("alice"), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_all_reports_count() {
        let app = TestApp::new();
        for i in 0..3 {
            app.send(
                Method::POST,
                "/api/entries",
                Some("alice"),
                Some(body(&format!("e{i}"), 5, "tired", "2026-03-01T08:00:00Z")),
            )
            .await;
        }

        let (status, json) = app
            .send(Method::DELETE, "/api/entries", Some("alice"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["deleted"], 3);

        let (_, json) = app.send(Method::GET, "/api/entries", Some("alice"), None).await;
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn test_store_outage_is_service_unavailable() {
        let app = TestApp::new();
        app.docs.set_unavailable(true).await;

        let (status, json) = app.send(Method::GET, "/api/entries", Some("alice"), None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], 503);

        let (status, _) = app.send(Method::GET, "/readyz", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    // ── Map ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_map_only_returns_located_entries() {
        let app = TestApp::new();
        let mut located = body("beach", 9, "relaxed", "2026-03-01T08:00:00Z");
        located["latitude"] = json!(34.0);
        located["longitude"] = json!(-118.5);
        app.send(Method::POST, "/api/entries", Some("alice"), Some(located))
            .await;
        app.send(
            Method::POST,
            "/api/entries",
            Some("alice"),
            Some(body("home", 5, "calm", "2026-03-02T08:00:00Z")),
        )
        .await;

        let (status, json) = app
            .send(Method::GET, "/api/entries/map", Some("alice"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let pins = json.as_array().unwrap();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0]["mood_title"], "beach");
        assert_eq!(pins[0]["coordinate"]["latitude"], 34.0);
    }
}
