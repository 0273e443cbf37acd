use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::rest::AppState;

/// The single role this system models.
pub const ROLE: &str = "asha_worker";

/// Claims carried by every issued session token. The server keeps no
/// session table; signature and expiry are the whole validity story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity claim - the configured username
    pub sub: String,
    pub role: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds), issuance + 24h
    pub exp: i64,
}

/// Sign a new session token for the authenticated username.
pub fn issue_token(config: &AuthConfig, username: &str) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        role: ROLE.to_string(),
        iat: now.timestamp(),
        exp: (now + config.token_ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Store(anyhow::Error::new(e)))
}

/// Verify a presented token and return its claims. Malformed, tampered
/// and expired tokens all surface as the same `InvalidToken`.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::InvalidToken)
}

/// Verified caller identity, extracted from the `Authorization: Bearer`
/// header. Adding this argument to a handler is what makes it protected.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingToken)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidToken)?;

        let claims = verify_token(&state.auth_config, token)?;
        Ok(AuthUser {
            username: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn issued_token_verifies_with_expected_claims() {
        let config = AuthConfig::for_tests();
        let token = issue_token(&config, "asha_worker").expect("issue token");

        let claims = verify_token(&config, &token).expect("verify token");
        assert_eq!(claims.sub, "asha_worker");
        assert_eq!(claims.role, ROLE);
        assert_eq!(claims.exp - claims.iat, Duration::hours(24).num_seconds());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let config = AuthConfig::for_tests();
        let result = verify_token(&config, "not-a-token");
        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }

    #[test]
    fn token_signed_with_a_different_secret_is_rejected() {
        let config = AuthConfig::for_tests();
        let other = AuthConfig {
            jwt_secret: "some-other-secret".to_string(),
            ..AuthConfig::for_tests()
        };

        let token = issue_token(&other, "asha_worker").expect("issue token");
        assert!(matches!(
            verify_token(&config, &token),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig::for_tests();
        let issued = Utc::now() - Duration::hours(25);
        let claims = Claims {
            sub: "asha_worker".to_string(),
            role: ROLE.to_string(),
            iat: issued.timestamp(),
            exp: (issued + Duration::hours(24)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .expect("encode expired token");

        assert!(matches!(
            verify_token(&config, &token),
            Err(ApiError::InvalidToken)
        ));
    }
}
