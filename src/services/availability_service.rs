//! src/services/availability_service.rs
//!
//! AvailabilityService — read-only queries over catways and reservations,
//! answering "is this berth free for these dates" and "which berths are
//! free for these dates". Decisions reuse the ledger's overlap predicate,
//! so an interval the ledger would refuse is never reported as free.

use crate::models::catway::{Catway, CatwayCategory, CatwayStatus};
use crate::services::reservation_service::intervals_overlap;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("end_date must be strictly after start_date")]
    InvalidInterval,
    #[error("`{0}` is not a valid category; expected small, medium, or large")]
    InvalidCategory(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type AvailabilityResult<T> = Result<T, AvailabilityError>;

#[derive(Clone)]
pub struct AvailabilityService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl AvailabilityService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Whether one catway is free for the half-open interval `[start, end)`.
    ///
    /// An unknown catway and a catway marked unavailable both answer false;
    /// the query asks "can this berth be booked", not "does it exist".
    pub async fn is_free(
        &self,
        catway_number: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AvailabilityResult<bool> {
        ensure_interval(start, end)?;

        let catway = sqlx::query_as::<_, Catway>(
            "SELECT number, category, status, created_at, updated_at
             FROM catways WHERE number = ?",
        )
        .bind(catway_number)
        .fetch_optional(&*self.db)
        .await?;

        let catway = match catway {
            Some(catway) => catway,
            None => return Ok(false),
        };
        if catway.status == CatwayStatus::Unavailable {
            return Ok(false);
        }

        Ok(!self.has_conflict(catway_number, start, end).await?)
    }

    /// Every catway free for `[start, end)`, ordered by berth number,
    /// optionally narrowed to one size category.
    ///
    /// Berths marked unavailable never appear, whatever their bookings.
    pub async fn list_free(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category: Option<&str>,
    ) -> AvailabilityResult<Vec<Catway>> {
        ensure_interval(start, end)?;

        let category = match category {
            Some(raw) => Some(
                CatwayCategory::parse(raw)
                    .ok_or_else(|| AvailabilityError::InvalidCategory(raw.to_string()))?,
            ),
            None => None,
        };

        let candidates = match category {
            Some(category) => {
                sqlx::query_as::<_, Catway>(
                    "SELECT number, category, status, created_at, updated_at
                     FROM catways WHERE category = ? ORDER BY number ASC",
                )
                .bind(category)
                .fetch_all(&*self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Catway>(
                    "SELECT number, category, status, created_at, updated_at
                     FROM catways ORDER BY number ASC",
                )
                .fetch_all(&*self.db)
                .await?
            }
        };

        let mut free = Vec::new();
        for catway in candidates {
            if catway.status == CatwayStatus::Unavailable {
                continue;
            }
            if !self.has_conflict(catway.number, start, end).await? {
                free.push(catway);
            }
        }

        Ok(free)
    }

    /// Whether any booking of the catway overlaps `[start, end)`.
    async fn has_conflict(
        &self,
        catway_number: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AvailabilityResult<bool> {
        let intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            "SELECT start_date, end_date FROM reservations WHERE catway_number = ?",
        )
        .bind(catway_number)
        .fetch_all(&*self.db)
        .await?;

        Ok(intervals
            .into_iter()
            .any(|(booked_start, booked_end)| intervals_overlap(start, end, booked_start, booked_end)))
    }
}

fn ensure_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> AvailabilityResult<()> {
    if end <= start {
        return Err(AvailabilityError::InvalidInterval);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reservation::CreateReservation;
    use crate::services::catway_service::CatwayService;
    use crate::services::reservation_service::ReservationService;
    use crate::services::test_support::memory_pool;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    async fn harbor() -> (CatwayService, ReservationService, AvailabilityService) {
        let db = memory_pool().await;
        (
            CatwayService::new(db.clone()),
            ReservationService::new(db.clone()),
            AvailabilityService::new(db),
        )
    }

    async fn book(
        reservations: &ReservationService,
        number: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) {
        reservations
            .create(
                number,
                CreateReservation {
                    client_name: "Dupont".to_string(),
                    vessel_name: "Mistral".to_string(),
                    start_date: start,
                    end_date: end,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unbooked_catway_is_free() {
        let (catways, _reservations, availability) = harbor().await;
        catways.create(1, "small", "free").await.unwrap();

        assert!(
            availability
                .is_free(1, date(2024, 6, 1), date(2024, 6, 5))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn overlapping_booking_blocks_but_boundary_touch_does_not() {
        let (catways, reservations, availability) = harbor().await;
        catways.create(4, "medium", "free").await.unwrap();
        book(&reservations, 4, date(2024, 6, 1), date(2024, 6, 5)).await;

        assert!(
            !availability
                .is_free(4, date(2024, 6, 4), date(2024, 6, 8))
                .await
                .unwrap()
        );
        assert!(
            availability
                .is_free(4, date(2024, 6, 5), date(2024, 6, 10))
                .await
                .unwrap()
        );
        assert!(
            availability
                .is_free(4, date(2024, 5, 20), date(2024, 6, 1))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn unknown_and_unavailable_catways_are_not_free() {
        let (catways, _reservations, availability) = harbor().await;
        catways.create(2, "small", "unavailable").await.unwrap();

        assert!(
            !availability
                .is_free(99, date(2024, 6, 1), date(2024, 6, 5))
                .await
                .unwrap()
        );
        assert!(
            !availability
                .is_free(2, date(2024, 6, 1), date(2024, 6, 5))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn inverted_interval_is_rejected() {
        let (_catways, _reservations, availability) = harbor().await;

        let err = availability
            .is_free(1, date(2024, 6, 5), date(2024, 6, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidInterval));

        let err = availability
            .list_free(date(2024, 6, 5), date(2024, 6, 5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidInterval));
    }

    #[tokio::test]
    async fn list_free_filters_and_orders() {
        let (catways, reservations, availability) = harbor().await;
        catways.create(3, "medium", "free").await.unwrap();
        catways.create(1, "small", "free").await.unwrap();
        catways.create(2, "medium", "free").await.unwrap();
        catways.create(5, "medium", "unavailable").await.unwrap();

        // Berth 2 is taken over the queried dates.
        book(&reservations, 2, date(2024, 6, 1), date(2024, 6, 5)).await;

        let free = availability
            .list_free(date(2024, 6, 2), date(2024, 6, 4), None)
            .await
            .unwrap();
        let numbers: Vec<i64> = free.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![1, 3]);

        let free_medium = availability
            .list_free(date(2024, 6, 2), date(2024, 6, 4), Some("medium"))
            .await
            .unwrap();
        let numbers: Vec<i64> = free_medium.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![3]);

        let err = availability
            .list_free(date(2024, 6, 2), date(2024, 6, 4), Some("huge"))
            .await
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::InvalidCategory(ref c) if c == "huge"));
    }

    #[tokio::test]
    async fn answers_agree_with_the_ledger() {
        let (catways, reservations, availability) = harbor().await;
        catways.create(4, "medium", "free").await.unwrap();
        book(&reservations, 4, date(2024, 6, 1), date(2024, 6, 5)).await;

        let (start, end) = (date(2024, 6, 3), date(2024, 6, 7));

        // The query engine says no, and the ledger refuses the same interval.
        assert!(!availability.is_free(4, start, end).await.unwrap());
        let err = reservations
            .create(
                4,
                CreateReservation {
                    client_name: "Martin".to_string(),
                    vessel_name: "Sirocco".to_string(),
                    start_date: start,
                    end_date: end,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::services::reservation_service::ReservationError::Overlap { .. }
        ));

        // The query engine says yes, and the ledger accepts.
        let (start, end) = (date(2024, 6, 5), date(2024, 6, 8));
        assert!(availability.is_free(4, start, end).await.unwrap());
        reservations
            .create(
                4,
                CreateReservation {
                    client_name: "Martin".to_string(),
                    vessel_name: "Sirocco".to_string(),
                    start_date: start,
                    end_date: end,
                },
            )
            .await
            .unwrap();
    }
}
