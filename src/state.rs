//! Shared application state handed to every handler.

use crate::services::availability_service::AvailabilityService;
use crate::services::catway_service::CatwayService;
use crate::services::reservation_service::ReservationService;
use crate::services::token_service::TokenService;
use crate::services::user_service::UserService;
use sqlx::SqlitePool;
use std::sync::Arc;

/// One instance per process, cloned cheaply into each request.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub catways: CatwayService,
    pub reservations: ReservationService,
    pub availability: AvailabilityService,
    pub users: UserService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, jwt_secret: &str) -> Self {
        Self {
            catways: CatwayService::new(db.clone()),
            reservations: ReservationService::new(db.clone()),
            availability: AvailabilityService::new(db.clone()),
            users: UserService::new(db.clone()),
            tokens: TokenService::new(jwt_secret),
            db,
        }
    }
}
