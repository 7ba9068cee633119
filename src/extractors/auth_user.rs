use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::auth;
use crate::config::Config;
use crate::error::AuthError;

/// Extractor that validates the bearer access token and provides the
/// authenticated user ID.
///
/// Access tokens are checked for signature and expiry only; they are not
/// revocable. A stolen access token stays valid until its short natural
/// expiry; revocation applies to refresh tokens.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
///     // user_id is the authenticated user's ID
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AuthError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        // Arc<Config> is installed as a request extension by the app router
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .ok_or_else(|| AuthError::Internal("Config not found in request".to_string()))?;

        let claims = auth::validate_token(token, &config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(AuthUser(user_id))
    }
}
