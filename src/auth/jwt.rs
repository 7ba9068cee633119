use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AuthError;

/// JWT claims payload.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Unique token id. Two tokens minted for the same subject in the same
    /// second must still differ, or rotation would revoke its own successor.
    pub jti: String,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a signed access/refresh token pair for a user.
///
/// Both tokens carry the same subject; only their expirations differ
/// (short-lived access, long-lived refresh). Pure function of the user id,
/// config, and the current time; persisting the refresh token's hash is the
/// caller's responsibility.
pub fn issue_token_pair(user_id: Uuid, config: &Config) -> Result<TokenPair, AuthError> {
    let sub = user_id.to_string();
    let access_token = create_token(
        &sub,
        &config.jwt_secret,
        Duration::minutes(config.access_token_ttl_mins as i64),
    )?;
    let refresh_token = create_token(
        &sub,
        &config.jwt_secret,
        Duration::days(config.refresh_token_ttl_days as i64),
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Create a signed JWT for the given subject with the given lifetime.
pub fn create_token(sub: &str, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let expires = now + ttl;

    let claims = Claims {
        sub: sub.to_string(),
        exp: expires.timestamp() as usize,
        iat: now.timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Failed to create token: {}", e)))
}

/// Validate a JWT (signature + expiry) and return the claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::Unauthorized(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Best-effort read of a token's `exp` claim, without verifying the
/// signature or expiry. Used by the revocation ledger to stamp its rows;
/// callers fall back to a default lifetime when this returns `None`.
pub fn decode_expiry(token: &str) -> Option<NaiveDateTime> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp as i64, 0).map(|dt| dt.naive_utc())
}
