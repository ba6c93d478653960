//! HTTP handlers for staff accounts and sessions.
//!
//! - POST   /users          -> register (public)
//! - GET    /users          -> list accounts, paginated (auth)
//! - GET    /users/{email}  -> fetch one account (auth)
//! - PUT    /users/{email}  -> change username and/or password (auth)
//! - DELETE /users/{email}  -> remove an account (auth)
//! - POST   /login          -> exchange credentials for a bearer token
//! - GET    /logout         -> acknowledge end of session (auth)
//!
//! Tokens are stateless, so logout does not revoke anything; the client
//! discards its token and the endpoint confirms the intent.

use crate::{
    auth::AuthUser,
    errors::ApiError,
    models::user::{
        LoginRequest, LoginResponse, RegisterUser, UpdateUser, UserPage, UserResponse,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query params for `GET /users`.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// `POST /users`
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.tokens.issue(&user)?;

    tracing::info!(email = %user.email, "login");
    Ok(Json(LoginResponse { token, user }))
}

/// `GET /logout`
pub async fn logout(auth: AuthUser) -> impl IntoResponse {
    tracing::info!(email = %auth.0.email, "logout");
    Json(json!({ "message": "logged out" }))
}

/// `GET /users`
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserPage>, ApiError> {
    let page = state
        .users
        .list(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(Json(page))
}

/// `GET /users/{email}`
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get_by_email(&email).await?;
    Ok(Json(user))
}

/// `PUT /users/{email}`
pub async fn update_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(email): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.update(&email, payload).await?;
    Ok(Json(user))
}

/// `DELETE /users/{email}` — returns the deleted account.
pub async fn delete_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.delete(&email).await?;
    Ok(Json(user))
}
