//! src/services/user_service.rs
//!
//! UserService — staff accounts keyed by email. Passwords are stored as
//! bcrypt hashes and never leave this module; lookups past registration
//! return [`UserResponse`]. Emails are normalized to lowercase on every
//! write and lookup, so uniqueness is case-insensitive.

use crate::models::user::{RegisterUser, UpdateUser, User, UserPage, UserResponse};
use crate::services::is_unique_violation;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
    #[error("username must be at least {USERNAME_MIN_LEN} characters")]
    UsernameTooShort,
    #[error("password must be at least {PASSWORD_MIN_LEN} characters")]
    PasswordTooShort,
    #[error("an account with email `{0}` already exists")]
    EmailTaken(String),
    #[error("username `{0}` is already in use")]
    UsernameTaken(String),
    #[error("no account with email `{0}`")]
    NotFound(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("update requires at least one of username or password")]
    EmptyUpdate,
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type UserResult<T> = Result<T, UserError>;

const USERNAME_MIN_LEN: usize = 3;
const PASSWORD_MIN_LEN: usize = 6;
const MAX_PAGE_SIZE: u32 = 100;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, created_at, updated_at";

/// UserService owns the accounts table and both sides of authentication:
/// registering credentials and checking them at login.
#[derive(Clone)]
pub struct UserService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl UserService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create an account.
    ///
    /// Username and password must meet the minimum lengths and the email
    /// must look like an address. Returns EmailTaken when the normalized
    /// email is already registered.
    pub async fn register(&self, payload: RegisterUser) -> UserResult<UserResponse> {
        let username = valid_username(&payload.username)?;
        let email = valid_email(&payload.email)?;
        valid_password(&payload.password)?;

        let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(UserError::EmailTaken(email));
        }

        let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        match sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.db)
        .await
        {
            Ok(_) => Ok(user.into()),
            // Concurrent registration of the same address.
            Err(err) if is_unique_violation(&err) => Err(UserError::EmailTaken(user.email)),
            Err(err) => Err(UserError::Sqlx(err)),
        }
    }

    /// Check credentials and return the account they belong to.
    ///
    /// Unknown email and wrong password fail identically so the endpoint
    /// cannot be used to probe which addresses are registered.
    pub async fn authenticate(&self, email: &str, password: &str) -> UserResult<UserResponse> {
        let email = normalize_email(email);

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(&email)
        .fetch_optional(&*self.db)
        .await?;

        let user = match user {
            Some(user) => user,
            None => return Err(UserError::InvalidCredentials),
        };

        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user.into())
    }

    /// Fetch one account by email. Returns NotFound if missing.
    pub async fn get_by_email(&self, email: &str) -> UserResult<UserResponse> {
        let email = valid_email(email)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(&email)
        .fetch_optional(&*self.db)
        .await?;

        user.map(UserResponse::from)
            .ok_or(UserError::NotFound(email))
    }

    /// One page of accounts, newest first. Page numbers start at 1.
    pub async fn list(&self, page: u32, page_size: u32) -> UserResult<UserPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) as i64 * page_size as i64;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             ORDER BY created_at DESC, email ASC LIMIT ? OFFSET ?"
        ))
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(&*self.db)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&*self.db)
            .await?;

        let total_pages = if total == 0 {
            0
        } else {
            ((total as u64 + page_size as u64 - 1) / page_size as u64) as u32
        };

        Ok(UserPage {
            users: users.into_iter().map(UserResponse::from).collect(),
            page,
            page_size,
            total,
            total_pages,
        })
    }

    /// Change an account's username, password, or both. The email is the
    /// lookup key and cannot be changed.
    pub async fn update(&self, email: &str, patch: UpdateUser) -> UserResult<UserResponse> {
        if patch.username.is_none() && patch.password.is_none() {
            return Err(UserError::EmptyUpdate);
        }

        let email = normalize_email(email);
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(&email)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| UserError::NotFound(email.clone()))?;

        let username = match &patch.username {
            Some(raw) => {
                let username = valid_username(raw)?;
                let taken: Option<Uuid> = sqlx::query_scalar(
                    "SELECT id FROM users WHERE username = ? AND id != ?",
                )
                .bind(&username)
                .bind(user.id)
                .fetch_optional(&*self.db)
                .await?;
                if taken.is_some() {
                    return Err(UserError::UsernameTaken(username));
                }
                username
            }
            None => user.username.clone(),
        };

        let password_hash = match &patch.password {
            Some(password) => {
                valid_password(password)?;
                bcrypt::hash(password, bcrypt::DEFAULT_COST)?
            }
            None => user.password_hash.clone(),
        };

        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = ?, password_hash = ?, updated_at = ?
             WHERE id = ?
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&username)
        .bind(&password_hash)
        .bind(Utc::now())
        .bind(user.id)
        .fetch_one(&*self.db)
        .await?;

        Ok(updated.into())
    }

    /// Remove an account. Returns the deleted record, or NotFound.
    pub async fn delete(&self, email: &str) -> UserResult<UserResponse> {
        let email = normalize_email(email);

        let deleted = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE email = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .fetch_optional(&*self.db)
        .await?;

        deleted
            .map(UserResponse::from)
            .ok_or(UserError::NotFound(email))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check the shape `local@domain` where the domain contains a dot with at
/// least one character on each side, and nothing contains whitespace or a
/// second `@`.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.contains('@') || domain.chars().any(char::is_whitespace) {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn valid_email(raw: &str) -> UserResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(UserError::InvalidEmail(raw.trim().to_string()));
    }
    Ok(email)
}

fn valid_username(raw: &str) -> UserResult<String> {
    let username = raw.trim();
    if username.chars().count() < USERNAME_MIN_LEN {
        return Err(UserError::UsernameTooShort);
    }
    Ok(username.to_string())
}

fn valid_password(password: &str) -> UserResult<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(UserError::PasswordTooShort);
    }
    Ok(())
}
