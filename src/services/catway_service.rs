//! src/services/catway_service.rs
//!
//! CatwayService — CRUD over the registry of mooring berths. Catways are
//! keyed by their positive berth number; category is fixed at creation and
//! only the status may change afterwards. Deletion refuses while any
//! reservation still references the berth.

use crate::models::catway::{Catway, CatwayCategory, CatwayStatus};
use crate::services::{is_foreign_key_violation, is_unique_violation};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatwayError {
    #[error("catway number must be a positive integer, got {0}")]
    InvalidNumber(i64),
    #[error("`{0}` is not a valid category; expected small, medium, or large")]
    InvalidCategory(String),
    #[error("`{0}` is not a valid status; expected free, occupied, or unavailable")]
    InvalidStatus(String),
    #[error("catway {0} not found")]
    NotFound(i64),
    #[error("catway {0} already exists")]
    AlreadyExists(i64),
    #[error("catway {number} still has {reservations} reservation(s) and cannot be deleted")]
    StillReferenced { number: i64, reservations: i64 },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type CatwayResult<T> = Result<T, CatwayError>;

/// CatwayService owns every read and write against the catways table.
#[derive(Clone)]
pub struct CatwayService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl CatwayService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// List every catway, ordered by berth number.
    pub async fn list(&self) -> CatwayResult<Vec<Catway>> {
        let catways = sqlx::query_as::<_, Catway>(
            "SELECT number, category, status, created_at, updated_at
             FROM catways ORDER BY number ASC",
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(catways)
    }

    /// Fetch one catway by number. Returns NotFound if missing.
    pub async fn get(&self, number: i64) -> CatwayResult<Catway> {
        sqlx::query_as::<_, Catway>(
            "SELECT number, category, status, created_at, updated_at
             FROM catways WHERE number = ?",
        )
        .bind(number)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => CatwayError::NotFound(number),
            other => CatwayError::Sqlx(other),
        })
    }

    /// Register a new catway.
    ///
    /// The number must be positive and unused; category and status must
    /// belong to their fixed vocabularies. Returns AlreadyExists on a
    /// duplicate number.
    pub async fn create(&self, number: i64, category: &str, status: &str) -> CatwayResult<Catway> {
        if number <= 0 {
            return Err(CatwayError::InvalidNumber(number));
        }
        let category = CatwayCategory::parse(category)
            .ok_or_else(|| CatwayError::InvalidCategory(category.to_string()))?;
        let status = CatwayStatus::parse(status)
            .ok_or_else(|| CatwayError::InvalidStatus(status.to_string()))?;

        let now = Utc::now();
        let catway = Catway {
            number,
            category,
            status,
            created_at: now,
            updated_at: now,
        };

        match sqlx::query(
            "INSERT INTO catways (number, category, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(catway.number)
        .bind(catway.category)
        .bind(catway.status)
        .bind(catway.created_at)
        .bind(catway.updated_at)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(catway),
            Err(err) if is_unique_violation(&err) => Err(CatwayError::AlreadyExists(number)),
            Err(err) => Err(CatwayError::Sqlx(err)),
        }
    }

    /// Change the status of a catway. Number and category are immutable,
    /// so this is the only mutation the registry allows.
    pub async fn set_status(&self, number: i64, status: &str) -> CatwayResult<Catway> {
        let status = CatwayStatus::parse(status)
            .ok_or_else(|| CatwayError::InvalidStatus(status.to_string()))?;

        let updated = sqlx::query_as::<_, Catway>(
            "UPDATE catways SET status = ?, updated_at = ?
             WHERE number = ?
             RETURNING number, category, status, created_at, updated_at",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(number)
        .fetch_optional(&*self.db)
        .await?;

        updated.ok_or(CatwayError::NotFound(number))
    }

    /// Delete a catway.
    ///
    /// Refused with StillReferenced while any reservation, past or future,
    /// points at the berth; the foreign key backs this up against races.
    /// Returns the deleted record.
    pub async fn delete(&self, number: i64) -> CatwayResult<Catway> {
        let catway = self.get(number).await?;

        let reservations = self.count_reservations(number).await?;
        if reservations > 0 {
            return Err(CatwayError::StillReferenced {
                number,
                reservations,
            });
        }

        match sqlx::query("DELETE FROM catways WHERE number = ?")
            .bind(number)
            .execute(&*self.db)
            .await
        {
            Ok(_) => Ok(catway),
            Err(err) if is_foreign_key_violation(&err) => {
                // A reservation landed between the count and the delete.
                let reservations = self.count_reservations(number).await?;
                Err(CatwayError::StillReferenced {
                    number,
                    reservations: reservations.max(1),
                })
            }
            Err(err) => Err(CatwayError::Sqlx(err)),
        }
    }

    async fn count_reservations(&self, number: i64) -> CatwayResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE catway_number = ?")
                .bind(number)
                .fetch_one(&*self.db)
                .await?;
        Ok(count)
    }
}
