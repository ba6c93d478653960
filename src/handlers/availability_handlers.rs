//! HTTP handlers for availability queries. Both routes are public reads:
//! prospective clients can check for a berth without an account.
//!
//! - GET /catways/{number}/availability?start=&end=            -> is this berth free
//! - GET /availability?start=&end=[&category=]                 -> which berths are free
//!
//! Dates are RFC 3339 timestamps; the queried interval is half-open.

use crate::{errors::ApiError, models::catway::Catway, state::AppState};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query params for `GET /catways/{number}/availability`.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Query params for `GET /availability`.
#[derive(Debug, Deserialize)]
pub struct FreeCatwaysQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub category: Option<String>,
}

/// Response body for the single-berth check, echoing the question asked.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub catway_number: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub free: bool,
}

/// `GET /catways/{number}/availability`
pub async fn check_catway(
    State(state): State<AppState>,
    Path(number): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let free = state
        .availability
        .is_free(number, query.start, query.end)
        .await?;

    Ok(Json(AvailabilityResponse {
        catway_number: number,
        start_date: query.start,
        end_date: query.end,
        free,
    }))
}

/// `GET /availability`
pub async fn list_free(
    State(state): State<AppState>,
    Query(query): Query<FreeCatwaysQuery>,
) -> Result<Json<Vec<Catway>>, ApiError> {
    let free = state
        .availability
        .list_free(query.start, query.end, query.category.as_deref())
        .await?;

    Ok(Json(free))
}
