//! src/services/reservation_service.rs
//!
//! ReservationService — the booking ledger. A reservation holds one catway
//! for a half-open interval `[start_date, end_date)`; two bookings of the
//! same catway may touch at a boundary but never overlap. Every write runs
//! its conflict check and its row write under that catway's lock, so racing
//! requests for the same berth serialize instead of double-booking.

use crate::models::reservation::{CreateReservation, Reservation, UpdateReservation};
use crate::services::{CatwayLocks, is_foreign_key_violation};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// True if the half-open intervals `[a_start, a_end)` and
/// `[b_start, b_end)` share at least one instant.
///
/// Both comparisons are strict, so an interval ending exactly when another
/// begins does not overlap. Every conflict decision in the service goes
/// through this one predicate.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("end_date must be strictly after start_date")]
    InvalidInterval,
    #[error("reservation {0} not found")]
    NotFound(Uuid),
    #[error("catway {0} not found")]
    CatwayNotFound(i64),
    #[error("catway {number} is already booked from {start} to {end}")]
    Overlap {
        number: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ReservationResult<T> = Result<T, ReservationError>;

const RESERVATION_COLUMNS: &str = "id, catway_number, client_name, vessel_name, \
     start_date, end_date, created_at, updated_at";

/// ReservationService owns the reservations table and the no-overlap
/// invariant over it.
#[derive(Clone)]
pub struct ReservationService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    /// Per-catway write locks, shared between create and update.
    locks: CatwayLocks,
}

impl ReservationService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            db,
            locks: CatwayLocks::default(),
        }
    }

    /// Book a catway for a client.
    ///
    /// Validates the payload, then takes the catway's write lock and checks
    /// for overlap before inserting. Returns CatwayNotFound for an unknown
    /// berth and Overlap when the interval clashes with an existing booking;
    /// in both cases the ledger is untouched.
    pub async fn create(
        &self,
        catway_number: i64,
        payload: CreateReservation,
    ) -> ReservationResult<Reservation> {
        let client_name = required_name(&payload.client_name, "client_name")?;
        let vessel_name = required_name(&payload.vessel_name, "vessel_name")?;
        ensure_interval(payload.start_date, payload.end_date)?;

        let lock = self.locks.acquire(catway_number).await;
        let _guard = lock.lock().await;

        self.validate_slot(catway_number, payload.start_date, payload.end_date, None)
            .await?;

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            catway_number,
            client_name,
            vessel_name,
            start_date: payload.start_date,
            end_date: payload.end_date,
            created_at: now,
            updated_at: now,
        };

        match sqlx::query(
            "INSERT INTO reservations
                 (id, catway_number, client_name, vessel_name,
                  start_date, end_date, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(reservation.id)
        .bind(reservation.catway_number)
        .bind(&reservation.client_name)
        .bind(&reservation.vessel_name)
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(reservation),
            // The berth was deleted between the existence check and the
            // insert; surface it the same way as the up-front check.
            Err(err) if is_foreign_key_violation(&err) => {
                Err(ReservationError::CatwayNotFound(catway_number))
            }
            Err(err) => Err(ReservationError::Sqlx(err)),
        }
    }

    /// Fetch one reservation by id. Returns NotFound if missing.
    pub async fn get(&self, id: Uuid) -> ReservationResult<Reservation> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => ReservationError::NotFound(id),
            other => ReservationError::Sqlx(other),
        })
    }

    /// List the bookings of one catway, soonest first.
    pub async fn list_for_catway(&self, catway_number: i64) -> ReservationResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE catway_number = ? ORDER BY start_date ASC"
        ))
        .bind(catway_number)
        .fetch_all(&*self.db)
        .await?;

        Ok(reservations)
    }

    /// List every booking in the ledger, soonest first.
    pub async fn list_all(&self) -> ReservationResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             ORDER BY start_date ASC, catway_number ASC"
        ))
        .fetch_all(&*self.db)
        .await?;

        Ok(reservations)
    }

    /// Modify a reservation. Absent fields keep their stored value.
    ///
    /// The merged result is revalidated from scratch, including the overlap
    /// check against every other booking of the target catway. Supplying a
    /// different catway_number moves the booking, subject to the same checks
    /// as creating it there.
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateReservation,
    ) -> ReservationResult<Reservation> {
        let existing = self.get(id).await?;

        let client_name = match &patch.client_name {
            Some(name) => Some(required_name(name, "client_name")?),
            None => None,
        };
        let vessel_name = match &patch.vessel_name {
            Some(name) => Some(required_name(name, "vessel_name")?),
            None => None,
        };

        let catway_number = patch.catway_number.unwrap_or(existing.catway_number);
        let start_date = patch.start_date.unwrap_or(existing.start_date);
        let end_date = patch.end_date.unwrap_or(existing.end_date);
        ensure_interval(start_date, end_date)?;

        let lock = self.locks.acquire(catway_number).await;
        let _guard = lock.lock().await;

        self.validate_slot(catway_number, start_date, end_date, Some(id))
            .await?;

        let reservation = Reservation {
            id,
            catway_number,
            client_name: client_name.unwrap_or(existing.client_name),
            vessel_name: vessel_name.unwrap_or(existing.vessel_name),
            start_date,
            end_date,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        match sqlx::query(
            "UPDATE reservations
             SET catway_number = ?, client_name = ?, vessel_name = ?,
                 start_date = ?, end_date = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(reservation.catway_number)
        .bind(&reservation.client_name)
        .bind(&reservation.vessel_name)
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(reservation.updated_at)
        .bind(reservation.id)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(reservation),
            Err(err) if is_foreign_key_violation(&err) => {
                Err(ReservationError::CatwayNotFound(catway_number))
            }
            Err(err) => Err(ReservationError::Sqlx(err)),
        }
    }

    /// Cancel a reservation. Returns the deleted record, or NotFound.
    pub async fn delete(&self, id: Uuid) -> ReservationResult<Reservation> {
        let reservation = self.get(id).await?;

        sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        Ok(reservation)
    }

    /// The one write-validation routine, shared verbatim by create and
    /// update: the catway must exist and `[start, end)` must not overlap
    /// any of its bookings other than `exclude`. Callers hold the catway
    /// lock.
    async fn validate_slot(
        &self,
        catway_number: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> ReservationResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT number FROM catways WHERE number = ?")
            .bind(catway_number)
            .fetch_optional(&*self.db)
            .await?;
        if exists.is_none() {
            return Err(ReservationError::CatwayNotFound(catway_number));
        }

        let others = self.list_for_catway(catway_number).await?;
        let conflict = others.into_iter().find(|other| {
            Some(other.id) != exclude
                && intervals_overlap(start, end, other.start_date, other.end_date)
        });

        match conflict {
            Some(other) => Err(ReservationError::Overlap {
                number: catway_number,
                start: other.start_date,
                end: other.end_date,
            }),
            None => Ok(()),
        }
    }
}

/// Trim a required name field, rejecting blank values.
fn required_name(value: &str, field: &'static str) -> ReservationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReservationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn ensure_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> ReservationResult<()> {
    if end <= start {
        return Err(ReservationError::InvalidInterval);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catway_service::CatwayService;
    use crate::services::test_support::memory_pool;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn booking(client: &str, vessel: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CreateReservation {
        CreateReservation {
            client_name: client.to_string(),
            vessel_name: vessel.to_string(),
            start_date: start,
            end_date: end,
        }
    }

    async fn services() -> (CatwayService, ReservationService) {
        let db = memory_pool().await;
        (
            CatwayService::new(db.clone()),
            ReservationService::new(db),
        )
    }

    #[test]
    fn overlap_predicate_truth_table() {
        let (a, b, c, d) = (date(2024, 6, 1), date(2024, 6, 5), date(2024, 6, 4), date(2024, 6, 8));

        // Plain overlap, both orders.
        assert!(intervals_overlap(a, b, c, d));
        assert!(intervals_overlap(c, d, a, b));

        // Containment.
        assert!(intervals_overlap(a, d, b, c));

        // Identical intervals.
        assert!(intervals_overlap(a, b, a, b));

        // Touching at the boundary is not an overlap, either side.
        assert!(!intervals_overlap(a, b, b, d));
        assert!(!intervals_overlap(b, d, a, b));

        // Fully disjoint.
        assert!(!intervals_overlap(a, c, date(2024, 6, 20), date(2024, 6, 25)));
    }

    #[tokio::test]
    async fn booking_scenario_on_one_berth() {
        let (catways, reservations) = services().await;
        catways.create(4, "medium", "free").await.unwrap();

        // Dupont books June 1-5.
        let first = reservations
            .create(4, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap();
        assert_eq!(first.catway_number, 4);
        assert_eq!(first.client_name, "Dupont");

        // June 4-8 clashes with Dupont.
        let err = reservations
            .create(4, booking("Martin", "Sirocco", date(2024, 6, 4), date(2024, 6, 8)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Overlap { number: 4, .. }));

        // June 5-10 only touches the boundary and is accepted.
        let third = reservations
            .create(4, booking("Martin", "Sirocco", date(2024, 6, 5), date(2024, 6, 10)))
            .await
            .unwrap();
        assert_eq!(third.start_date, first.end_date);

        let ledger = reservations.list_for_catway(4).await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].client_name, "Dupont");
        assert_eq!(ledger[1].client_name, "Martin");
    }

    #[tokio::test]
    async fn create_rejects_unknown_catway_and_leaves_ledger_untouched() {
        let (_catways, reservations) = services().await;

        let err = reservations
            .create(99, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::CatwayNotFound(99)));

        assert!(reservations.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_bad_intervals() {
        let (catways, reservations) = services().await;
        catways.create(1, "small", "free").await.unwrap();

        // Inverted.
        let err = reservations
            .create(1, booking("Dupont", "Mistral", date(2024, 6, 5), date(2024, 6, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::InvalidInterval));

        // Empty.
        let err = reservations
            .create(1, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::InvalidInterval));
    }

    #[tokio::test]
    async fn create_rejects_blank_names() {
        let (catways, reservations) = services().await;
        catways.create(1, "small", "free").await.unwrap();

        let err = reservations
            .create(1, booking("   ", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::MissingField("client_name")));

        let err = reservations
            .create(1, booking("Dupont", "", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::MissingField("vessel_name")));
    }

    #[tokio::test]
    async fn update_into_overlap_is_rejected_and_row_unchanged() {
        let (catways, reservations) = services().await;
        catways.create(4, "medium", "free").await.unwrap();

        reservations
            .create(4, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap();
        let second = reservations
            .create(4, booking("Martin", "Sirocco", date(2024, 6, 5), date(2024, 6, 10)))
            .await
            .unwrap();

        // Pulling the start back into Dupont's interval must fail.
        let err = reservations
            .update(
                second.id,
                UpdateReservation {
                    start_date: Some(date(2024, 6, 3)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Overlap { number: 4, .. }));

        let unchanged = reservations.get(second.id).await.unwrap();
        assert_eq!(unchanged.start_date, date(2024, 6, 5));
        assert_eq!(unchanged.end_date, date(2024, 6, 10));
    }

    #[tokio::test]
    async fn update_does_not_conflict_with_itself() {
        let (catways, reservations) = services().await;
        catways.create(4, "medium", "free").await.unwrap();

        let created = reservations
            .create(4, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap();

        // Extending its own interval overlaps the stored row, which is
        // excluded from the check.
        let updated = reservations
            .update(
                created.id,
                UpdateReservation {
                    end_date: Some(date(2024, 6, 7)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.end_date, date(2024, 6, 7));
    }

    #[tokio::test]
    async fn update_moves_booking_to_another_catway() {
        let (catways, reservations) = services().await;
        catways.create(1, "small", "free").await.unwrap();
        catways.create(2, "small", "free").await.unwrap();

        let moving = reservations
            .create(1, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap();
        reservations
            .create(2, booking("Martin", "Sirocco", date(2024, 6, 2), date(2024, 6, 4)))
            .await
            .unwrap();

        // Berth 2 is taken over those dates.
        let err = reservations
            .update(
                moving.id,
                UpdateReservation {
                    catway_number: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::Overlap { number: 2, .. }));

        // Moving to an unknown berth fails too.
        let err = reservations
            .update(
                moving.id,
                UpdateReservation {
                    catway_number: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReservationError::CatwayNotFound(9)));

        // Later dates on berth 2 are fine.
        let updated = reservations
            .update(
                moving.id,
                UpdateReservation {
                    catway_number: Some(2),
                    start_date: Some(date(2024, 6, 10)),
                    end_date: Some(date(2024, 6, 12)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.catway_number, 2);

        assert!(reservations.list_for_catway(1).await.unwrap().is_empty());
        assert_eq!(reservations.list_for_catway(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_patch_is_a_validated_no_op() {
        let (catways, reservations) = services().await;
        catways.create(1, "small", "free").await.unwrap();

        let created = reservations
            .create(1, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap();

        let updated = reservations
            .update(created.id, UpdateReservation::default())
            .await
            .unwrap();
        assert_eq!(updated.client_name, "Dupont");
        assert_eq!(updated.start_date, created.start_date);
        assert_eq!(updated.end_date, created.end_date);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (catways, reservations) = services().await;
        catways.create(1, "small", "free").await.unwrap();

        let created = reservations
            .create(1, booking("Dupont", "Mistral", date(2024, 6, 1), date(2024, 6, 5)))
            .await
            .unwrap();

        let deleted = reservations.delete(created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);

        let err = reservations.get(created.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::NotFound(id) if id == created.id));

        let err = reservations.delete(created.id).await.unwrap_err();
        assert!(matches!(err, ReservationError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_requests_for_one_berth_yield_a_single_booking() {
        let (catways, reservations) = services().await;
        catways.create(4, "medium", "free").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..6 {
            let svc = reservations.clone();
            handles.push(tokio::spawn(async move {
                svc.create(
                    4,
                    CreateReservation {
                        client_name: format!("client-{i}"),
                        vessel_name: format!("vessel-{i}"),
                        start_date: date(2024, 6, 1),
                        end_date: date(2024, 6, 5),
                    },
                )
                .await
            }));
        }

        let mut booked = 0;
        let mut overlaps = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => booked += 1,
                Err(ReservationError::Overlap { number: 4, .. }) => overlaps += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(booked, 1);
        assert_eq!(overlaps, 5);
        assert_eq!(reservations.list_for_catway(4).await.unwrap().len(), 1);
    }
}
