//! HTTP handlers for the catway registry.
//!
//! - GET    /catways           -> list every catway
//! - POST   /catways           -> register a catway (auth)
//! - GET    /catways/{number}  -> fetch one catway
//! - PUT    /catways/{number}  -> change its status (auth)
//! - DELETE /catways/{number}  -> remove it (auth)

use crate::{auth::AuthUser, errors::ApiError, models::catway::Catway, state::AppState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

/// Request body for `POST /catways`.
#[derive(Debug, Deserialize)]
pub struct CreateCatwayRequest {
    pub number: i64,
    pub category: String,
    pub status: String,
}

/// Request body for `PUT /catways/{number}`. Only the status can change;
/// number and category are fixed at creation.
#[derive(Debug, Deserialize)]
pub struct UpdateCatwayRequest {
    pub status: String,
}

/// `GET /catways`
pub async fn list_catways(State(state): State<AppState>) -> Result<Json<Vec<Catway>>, ApiError> {
    let catways = state.catways.list().await?;
    Ok(Json(catways))
}

/// `GET /catways/{number}`
pub async fn get_catway(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> Result<Json<Catway>, ApiError> {
    let catway = state.catways.get(number).await?;
    Ok(Json(catway))
}

/// `POST /catways`
pub async fn create_catway(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateCatwayRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let catway = state
        .catways
        .create(payload.number, &payload.category, &payload.status)
        .await?;
    Ok((StatusCode::CREATED, Json(catway)))
}

/// `PUT /catways/{number}`
pub async fn update_catway(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(number): Path<i64>,
    Json(payload): Json<UpdateCatwayRequest>,
) -> Result<Json<Catway>, ApiError> {
    let catway = state.catways.set_status(number, &payload.status).await?;
    Ok(Json(catway))
}

/// `DELETE /catways/{number}` — refused while reservations still reference
/// the berth. Returns the deleted record.
pub async fn delete_catway(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(number): Path<i64>,
) -> Result<Json<Catway>, ApiError> {
    let catway = state.catways.delete(number).await?;
    Ok(Json(catway))
}
