use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    errors::{AppError, ErrorResponse},
    models::user::Claims,
    state::AppState,
};

/// Verified identity of the caller, taken from the bearer token's `sub` claim.
pub struct AuthClaims(pub Claims);

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = ErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Unauthorized("Missing or invalid Authorization header".into())
                        .to_response()
                })?;

        AuthClaims::from_token(bearer.token(), &state.jwt_secret).map_err(|e| e.to_response())
    }
}

impl AuthClaims {
    pub fn from_token(token: &str, secret: &str) -> Result<Self, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::warn!("Rejected bearer token: {}", e);
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(Self(token_data.claims))
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".into()))
    }
}

/// Mint a token the way the identity provider does. Used by tooling and tests.
pub fn generate_jwt(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let expiration = (Utc::now() + ttl).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AppError::JwtError)
}
