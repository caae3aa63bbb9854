use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, Local, Utc};
use validator::Validate;

use super::repository_for;
use crate::analytics::MoodSummary;
use crate::auth::middleware::AuthUser;
use crate::dto::AnalyticsQuery;
use crate::error::{AppError, AppResult};
use crate::store::SortOrder;
use crate::AppState;

pub async fn get_summary(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<MoodSummary>> {
    query.validate()?;

    let now = reference_now(query.tz_offset_minutes, Utc::now())?;
    let window_days = query
        .window_days
        .unwrap_or(state.config.rolling_window_days);

    let repo = repository_for(&state, auth_user);
    repo.refresh(SortOrder::Descending).await?;

    Ok(Json(MoodSummary::compute(&repo.entries(), now, window_days)))
}

/// `now` seen from the caller's offset, or from the server's local offset
/// when the caller did not send one.
fn reference_now(
    tz_offset_minutes: Option<i32>,
    now: DateTime<Utc>,
) -> AppResult<DateTime<FixedOffset>> {
    let offset = match tz_offset_minutes {
        Some(minutes) => FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            AppError::Validation(format!("Invalid UTC offset: {minutes} minutes"))
        })?,
        None => *now.with_timezone(&Local).offset(),
    };
    Ok(now.with_timezone(&offset))
}
