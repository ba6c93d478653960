//! Core data models for the marina booking service.
//!
//! These entities represent catways, reservations, and staff accounts.
//! They map cleanly to database tables via `sqlx::FromRow` and serialize
//! naturally as JSON via `serde`.

pub mod catway;
pub mod reservation;
pub mod user;
