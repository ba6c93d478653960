//! Defines routes for every marina endpoint.
//!
//! ## Structure
//! - **Catway registry**
//!   - `GET    /catways`          — list catways (public)
//!   - `POST   /catways`          — register a catway (auth)
//!   - `GET    /catways/{number}` — fetch one catway (public)
//!   - `PUT    /catways/{number}` — change its status (auth)
//!   - `DELETE /catways/{number}` — remove it (auth)
//!
//! - **Reservation ledger** (all auth)
//!   - `GET    /catways/{number}/reservations`      — that catway's bookings
//!   - `POST   /catways/{number}/reservations`      — book the catway
//!   - `GET    /catways/{number}/reservations/{id}` — fetch one booking
//!   - `PUT    /catways/{number}/reservations/{id}` — modify or move it
//!   - `DELETE /catways/{number}/reservations/{id}` — cancel it
//!   - `GET    /reservations`                       — the whole ledger
//!
//! - **Availability queries** (public)
//!   - `GET /catways/{number}/availability` — is this berth free
//!   - `GET /availability`                  — which berths are free
//!
//! - **Accounts and sessions**
//!   - `POST   /users         ` — register (public)
//!   - `GET    /users         ` — list accounts (auth)
//!   - `GET    /users/{email} ` — fetch one account (auth)
//!   - `PUT    /users/{email} ` — update it (auth)
//!   - `DELETE /users/{email} ` — remove it (auth)
//!   - `POST   /login         ` — exchange credentials for a token (public)
//!   - `GET    /logout        ` — acknowledge end of session (auth)
//!
//! Auth means the handler takes an `AuthUser` and rejects requests without
//! a valid bearer token; the table above is the whole access policy.

use crate::{
    handlers::{
        availability_handlers::{check_catway, list_free},
        catway_handlers::{
            create_catway, delete_catway, get_catway, list_catways, update_catway,
        },
        health_handlers::{healthz, readyz},
        reservation_handlers::{
            create_reservation, delete_reservation, get_reservation, list_all, list_for_catway,
            update_reservation,
        },
        user_handlers::{
            delete_user, get_user, list_users, login, logout, register, update_user,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for every endpoint.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // catway registry
        .route("/catways", get(list_catways).post(create_catway))
        .route(
            "/catways/{number}",
            get(get_catway).put(update_catway).delete(delete_catway),
        )
        // reservations, scoped under their catway
        .route(
            "/catways/{number}/reservations",
            get(list_for_catway).post(create_reservation),
        )
        .route(
            "/catways/{number}/reservations/{id}",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
        .route("/reservations", get(list_all))
        // availability
        .route("/catways/{number}/availability", get(check_catway))
        .route("/availability", get(list_free))
        // accounts and sessions
        .route("/users", post(register).get(list_users))
        .route(
            "/users/{email}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/login", post(login))
        .route("/logout", get(logout))
}
