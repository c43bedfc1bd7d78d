//! Supabase JWT authentication.
//!
//! Tokens are HS256-signed with the project's JWT secret and carry the
//! audience `authenticated`. Generation endpoints accept anonymous requests
//! unless `REQUIRE_AUTH_FOR_GENERATE` is set; a token, when present, is
//! always verified.

use axum::http::HeaderMap;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::warn;

use crate::errors::ApiError;

/// Owner id recorded for unauthenticated requests.
pub const ANONYMOUS_OWNER_ID: &str = "anonymous";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub require_auth: bool,
}

impl AuthConfig {
    /// Same secret, but never requires a token. The REQUIRE_AUTH_FOR_GENERATE
    /// gate covers only the study pack routes; other routes verify a token
    /// when one is presented but always accept anonymous requests.
    pub fn optional(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            require_auth: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// The identity attached to a request after token verification.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn decode_token(config: &AuthConfig, token: &str) -> Result<AuthUser, ApiError> {
    if config.jwt_secret.is_empty() {
        return Err(ApiError::service_unavailable(
            "Auth is not configured (JWT_SECRET missing).",
        ));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["authenticated"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::unauthorized("Token has expired"),
        _ => ApiError::unauthorized(format!("Invalid token: {}", e)),
    })?;

    if data.claims.sub.is_empty() {
        return Err(ApiError::unauthorized("Token missing subject claim"));
    }

    Ok(AuthUser {
        user_id: data.claims.sub,
        email: data.claims.email,
        role: data.claims.role,
    })
}

/// Resolve the identity for a request.
///
/// Without an Authorization header the result is `Ok(None)` when anonymous
/// access is allowed, or 401 when `require_auth` is set. A header that is
/// present is always verified, even on anonymous-allowed endpoints.
pub fn authenticate(config: &AuthConfig, headers: &HeaderMap) -> Result<Option<AuthUser>, ApiError> {
    match bearer_token(headers) {
        Some(token) => {
            let user = decode_token(config, token)?;
            Ok(Some(user))
        }
        None => {
            if config.require_auth {
                warn!("Rejected unauthenticated generation request");
                return Err(ApiError::unauthorized("Missing Authorization header"));
            }
            Ok(None)
        }
    }
}

/// The owner id to record against stored artifacts for this request.
pub fn owner_id(user: Option<&AuthUser>) -> String {
    user.map(|u| u.user_id.clone())
        .unwrap_or_else(|| ANONYMOUS_OWNER_ID.to_string())
}
