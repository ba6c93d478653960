//! src/services/token_service.rs
//!
//! TokenService — issues and verifies the signed bearer tokens that guard
//! the write endpoints. Tokens are HS256 JWTs carrying the account id,
//! email, and username, valid for [`TOKEN_TTL_HOURS`] hours.

use crate::models::user::{Claims, UserResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use thiserror::Error;

/// How long an issued token stays valid.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid")]
    Invalid,
    #[error("failed to sign token")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

pub type TokenResult<T> = Result<T, TokenError>;

/// TokenService holds the signing keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mint a token for an account, valid for [`TOKEN_TTL_HOURS`] from now.
    pub fn issue(&self, user: &UserResponse) -> TokenResult<String> {
        self.issue_with_ttl(user, TOKEN_TTL_HOURS)
    }

    fn issue_with_ttl(&self, user: &UserResponse, ttl_hours: i64) -> TokenResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Check a token's signature and expiry and return its claims.
    pub fn verify(&self, token: &str) -> TokenResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn captain() -> UserResponse {
        UserResponse {
            id: Uuid::new_v4(),
            username: "capitaine".to_string(),
            email: "port@marina.fr".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issue_then_verify_roundtrips_the_claims() {
        let svc = TokenService::new("test-secret");
        let user = captain();

        let token = svc.issue(&user).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let svc = TokenService::new("test-secret");

        let token = svc.issue_with_ttl(&captain(), -2).unwrap();
        let err = svc.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn garbage_and_foreign_tokens_are_invalid() {
        let svc = TokenService::new("test-secret");

        let err = svc.verify("not-a-token").unwrap_err();
        assert!(matches!(err, TokenError::Invalid));

        let foreign = TokenService::new("other-secret").issue(&captain()).unwrap();
        let err = svc.verify(&foreign).unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }
}
