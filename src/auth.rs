//! Request authentication.
//!
//! Guarded handlers take an [`AuthUser`] argument; the extractor pulls the
//! bearer token from the Authorization header and verifies it against the
//! token service. Handlers without the argument stay public.

use crate::errors::ApiError;
use crate::models::user::Claims;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// The verified identity of the caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// Extract the token from an `Authorization: Bearer <token>` value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = header_value.and_then(bearer_token).ok_or_else(|| {
            ApiError::Unauthorized(
                "missing or malformed Authorization header; expected `Bearer <token>`".to_string(),
            )
        })?;

        let claims = state.tokens.verify(token)?;
        Ok(AuthUser(claims))
    }
}
