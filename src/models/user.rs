//! Represents a staff account and the token claims minted for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A staff account as stored. Deliberately not `Serialize`: the password
/// hash must never reach a response body. Convert to [`UserResponse`]
/// before returning.
#[derive(Clone, FromRow, Debug)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public shape of an account, safe to serialize.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Claims carried inside a signed access token.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    /// Account id of the token holder.
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Payload for registering an account.
#[derive(Deserialize, Debug)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial update of an account. Email is the lookup key and cannot be
/// changed here.
#[derive(Deserialize, Debug, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Credentials presented at login.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: a bearer token plus the account it belongs to.
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// One page of accounts.
#[derive(Serialize, Debug)]
pub struct UserPage {
    pub users: Vec<UserResponse>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: u32,
}
