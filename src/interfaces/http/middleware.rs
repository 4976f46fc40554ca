//! Bearer JWT authentication middleware
//!
//! Verified claims become a [`Principal`] in the request extensions;
//! handlers take it with `Extension<Principal>`.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::ErrorKind;

use crate::domain::Principal;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};
use crate::interfaces::http::common::ApiResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingToken => "Missing authentication token",
            Self::InvalidToken => "Invalid authentication token",
            Self::ExpiredToken => "Token has expired",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(message)),
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the acting principal from the `Authorization` header.
pub fn authenticate(header_value: Option<&str>, config: &JwtConfig) -> Result<Principal, AuthError> {
    let value = header_value.ok_or(AuthError::MissingToken)?;
    let token = bearer_token(value).ok_or(AuthError::InvalidToken)?;

    match verify_token(token, config) {
        Ok(claims) => Ok(claims.into_principal()),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AuthError::ExpiredToken),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            Err(AuthError::InvalidToken)
        }
    }
}

pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate(header_value, &auth.jwt_config) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::infrastructure::crypto::jwt::{create_token, TokenClaims};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn config() -> JwtConfig {
        JwtConfig::new("test-secret", "scootygo")
    }

    #[test]
    fn valid_token_yields_principal() {
        let principal = Principal::new("u1", "asha", Role::Renter).with_email("asha@example.com");
        let token = create_token(&principal, &config()).unwrap();
        let header = format!("Bearer {}", token);

        let resolved = authenticate(Some(&header), &config()).unwrap();
        assert_eq!(resolved.user_id, "u1");
        assert_eq!(resolved.email.as_deref(), Some("asha@example.com"));
        assert!(!resolved.is_staff());
    }

    #[test]
    fn missing_and_malformed_headers_are_rejected() {
        assert_eq!(authenticate(None, &config()).unwrap_err(), AuthError::MissingToken);
        assert_eq!(
            authenticate(Some("Basic abc"), &config()).unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            authenticate(Some("Bearer "), &config()).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let principal = Principal::new("u1", "asha", Role::Renter);
        let token = create_token(&principal, &JwtConfig::new("other", "scootygo")).unwrap();
        let header = format!("Bearer {}", token);
        assert_eq!(
            authenticate(Some(&header), &config()).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let principal = Principal::new("u1", "asha", Role::Renter);
        let mut claims = TokenClaims::new(&principal, &config());
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        let header = format!("Bearer {}", token);
        assert_eq!(
            authenticate(Some(&header), &config()).unwrap_err(),
            AuthError::ExpiredToken
        );
    }
}
