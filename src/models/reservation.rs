//! Represents a reservation — a client's booking of one catway for a
//! half-open date interval `[start_date, end_date)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A booking of a single catway.
///
/// The interval is half-open: the berth is held from `start_date` inclusive
/// to `end_date` exclusive, so a reservation ending at noon and another
/// starting at noon on the same berth do not conflict.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Reservation {
    /// Opaque reservation identifier.
    pub id: Uuid,

    /// Number of the catway being booked.
    pub catway_number: i64,

    /// Name of the client holding the booking.
    pub client_name: String,

    /// Name of the vessel occupying the berth.
    pub vessel_name: String,

    /// Start of the booked interval, inclusive.
    pub start_date: DateTime<Utc>,

    /// End of the booked interval, exclusive.
    pub end_date: DateTime<Utc>,

    /// When this reservation was recorded.
    pub created_at: DateTime<Utc>,

    /// When this reservation was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a reservation. The target catway comes from the
/// request path, not the body.
#[derive(Deserialize, Debug)]
pub struct CreateReservation {
    pub client_name: String,
    pub vessel_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Partial update of a reservation. Absent fields keep their stored value.
/// Supplying `catway_number` moves the booking to another berth, subject to
/// the same conflict checks as creation.
#[derive(Deserialize, Debug, Default)]
pub struct UpdateReservation {
    pub catway_number: Option<i64>,
    pub client_name: Option<String>,
    pub vessel_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}
