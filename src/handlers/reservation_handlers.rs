//! HTTP handlers for the reservation ledger.
//!
//! Reservations live under the catway they book:
//!
//! - GET    /catways/{number}/reservations       -> list that catway's bookings
//! - POST   /catways/{number}/reservations       -> book the catway
//! - GET    /catways/{number}/reservations/{id}  -> fetch one booking
//! - PUT    /catways/{number}/reservations/{id}  -> modify it (may move it)
//! - DELETE /catways/{number}/reservations/{id}  -> cancel it
//! - GET    /reservations                        -> the whole ledger
//!
//! All routes require auth. A reservation addressed under a catway it does
//! not currently book answers 404.

use crate::{
    auth::AuthUser,
    errors::ApiError,
    models::reservation::{CreateReservation, Reservation, UpdateReservation},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Parse a reservation id from its path segment. Answers 400, not 404, for
/// something that could never be an id.
fn parse_reservation_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::InvalidInput(format!("`{raw}` is not a valid reservation id")))
}

/// A reservation reached through the wrong catway's collection is treated
/// as absent from it.
fn ensure_catway_scope(reservation: &Reservation, catway_number: i64) -> Result<(), ApiError> {
    if reservation.catway_number != catway_number {
        return Err(ApiError::NotFound(format!(
            "reservation {} not found on catway {catway_number}",
            reservation.id
        )));
    }
    Ok(())
}

/// `GET /catways/{number}/reservations`
pub async fn list_for_catway(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(number): Path<i64>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    // An unknown catway is a 404, not an empty list.
    state.catways.get(number).await?;
    let reservations = state.reservations.list_for_catway(number).await?;
    Ok(Json(reservations))
}

/// `GET /reservations`
pub async fn list_all(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    let reservations = state.reservations.list_all().await?;
    Ok(Json(reservations))
}

/// `POST /catways/{number}/reservations`
pub async fn create_reservation(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(number): Path<i64>,
    Json(payload): Json<CreateReservation>,
) -> Result<impl IntoResponse, ApiError> {
    let reservation = state.reservations.create(number, payload).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// `GET /catways/{number}/reservations/{id}`
pub async fn get_reservation(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((number, id)): Path<(i64, String)>,
) -> Result<Json<Reservation>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let reservation = state.reservations.get(id).await?;
    ensure_catway_scope(&reservation, number)?;
    Ok(Json(reservation))
}

/// `PUT /catways/{number}/reservations/{id}` — a `catway_number` in the
/// body moves the booking to that berth, under the same conflict checks.
pub async fn update_reservation(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((number, id)): Path<(i64, String)>,
    Json(payload): Json<UpdateReservation>,
) -> Result<Json<Reservation>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let existing = state.reservations.get(id).await?;
    ensure_catway_scope(&existing, number)?;

    let reservation = state.reservations.update(id, payload).await?;
    Ok(Json(reservation))
}

/// `DELETE /catways/{number}/reservations/{id}` — returns the cancelled
/// booking.
pub async fn delete_reservation(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((number, id)): Path<(i64, String)>,
) -> Result<Json<Reservation>, ApiError> {
    let id = parse_reservation_id(&id)?;
    let existing = state.reservations.get(id).await?;
    ensure_catway_scope(&existing, number)?;

    let reservation = state.reservations.delete(id).await?;
    Ok(Json(reservation))
}
