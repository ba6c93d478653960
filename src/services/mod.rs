//! src/services/mod.rs
//!
//! Business logic, one service per resource. Handlers stay thin and call
//! into these; everything here is HTTP-agnostic and tested directly
//! against an in-memory database.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod availability_service;
pub mod catway_service;
pub mod reservation_service;
pub mod token_service;
pub mod user_service;

/// Registry of per-catway write locks.
///
/// A reservation write must hold the lock of its target catway from the
/// conflict check through the row write, so two requests racing for the
/// same berth serialize instead of both passing the check. Locks for
/// different catways do not contend.
#[derive(Clone, Default)]
pub struct CatwayLocks {
    locks: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl CatwayLocks {
    /// Return the lock guarding writes for one catway, creating it on
    /// first use. The caller locks the returned mutex for the duration
    /// of its check-then-write sequence.
    pub async fn acquire(&self, catway_number: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(catway_number).or_default().clone()
    }
}

/// Return true if a SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

/// Return true if a SQLx error indicates a foreign key constraint violation.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.message().to_ascii_lowercase().contains("foreign key")
    )
}
