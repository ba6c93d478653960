use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::availability_service::AvailabilityError;
use crate::services::catway_service::CatwayError;
use crate::services::reservation_service::ReservationError;
use crate::services::token_service::TokenError;
use crate::services::user_service::UserError;

/// The error surface of the HTTP API. Every failure a handler can return
/// collapses into one of these kinds; service-level errors convert via the
/// `From` impls below so handlers can use `?` throughout.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was structurally understood but semantically invalid.
    #[error("{0}")]
    InvalidInput(String),

    /// Authentication is missing, malformed, expired, or wrong.
    #[error("{0}")]
    Unauthorized(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation is valid but clashes with current state.
    #[error("{0}")]
    Conflict(String),

    /// Something broke on our side. The detail is logged, not returned.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<CatwayError> for ApiError {
    fn from(err: CatwayError) -> Self {
        let message = err.to_string();
        match err {
            CatwayError::InvalidNumber(_)
            | CatwayError::InvalidCategory(_)
            | CatwayError::InvalidStatus(_) => Self::InvalidInput(message),
            CatwayError::NotFound(_) => Self::NotFound(message),
            CatwayError::AlreadyExists(_) | CatwayError::StillReferenced { .. } => {
                Self::Conflict(message)
            }
            CatwayError::Sqlx(_) => Self::Internal(message),
        }
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        let message = err.to_string();
        match err {
            ReservationError::MissingField(_) | ReservationError::InvalidInterval => {
                Self::InvalidInput(message)
            }
            ReservationError::NotFound(_) | ReservationError::CatwayNotFound(_) => {
                Self::NotFound(message)
            }
            ReservationError::Overlap { .. } => Self::Conflict(message),
            ReservationError::Sqlx(_) => Self::Internal(message),
        }
    }
}

impl From<AvailabilityError> for ApiError {
    fn from(err: AvailabilityError) -> Self {
        let message = err.to_string();
        match err {
            AvailabilityError::InvalidInterval | AvailabilityError::InvalidCategory(_) => {
                Self::InvalidInput(message)
            }
            AvailabilityError::Sqlx(_) => Self::Internal(message),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::InvalidEmail(_)
            | UserError::UsernameTooShort
            | UserError::PasswordTooShort
            | UserError::EmptyUpdate => Self::InvalidInput(message),
            UserError::EmailTaken(_) | UserError::UsernameTaken(_) => Self::Conflict(message),
            UserError::NotFound(_) => Self::NotFound(message),
            UserError::InvalidCredentials => Self::Unauthorized(message),
            UserError::Bcrypt(_) | UserError::Sqlx(_) => Self::Internal(message),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        let message = err.to_string();
        match err {
            TokenError::Expired | TokenError::Invalid => Self::Unauthorized(message),
            TokenError::Encode(_) => Self::Internal(message),
        }
    }
}
