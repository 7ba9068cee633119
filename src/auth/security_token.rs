//! Single-use, expiring token stores for password reset and email
//! verification.
//!
//! Tokens are high-entropy random values; only a salted hash is persisted and
//! the plaintext travels once, inside the outgoing email. Because every hash
//! carries its own salt there is no indexed lookup: consumption re-hashes the
//! presented plaintext against every live candidate row. At the scale of
//! "unexpired, unused reset/verification tokens" the linear scan is fine.

use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::auth::password::{hash_password_blocking, verify_password};
use crate::error::AuthError;
use crate::models::{password_reset_token, verification_token};

/// Password-reset tokens live for one hour.
pub const PASSWORD_RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Verification tokens live for 24 hours.
pub const VERIFICATION_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Generate a cryptographically secure random token (32 bytes, hex-encoded).
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Create a password-reset token. Returns the raw token for out-of-band
/// delivery; the DB stores only the hash.
pub async fn create_password_reset_token<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<String, AuthError> {
    let raw_token = generate_secure_token();
    let token_hash = hash_password_blocking(raw_token.clone()).await?;
    let now = Utc::now().naive_utc();

    let model = password_reset_token::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(token_hash),
        expires_at: Set(now + Duration::seconds(PASSWORD_RESET_TOKEN_TTL_SECS)),
        used: Set(false),
        created_at: Set(now),
        ..Default::default()
    };
    model.insert(conn).await?;

    Ok(raw_token)
}

/// Consume a password-reset token: scan the live candidates for a hash match
/// and mark the matched row used. Returns the owning user's id.
pub async fn consume_password_reset_token<C: ConnectionTrait>(
    conn: &C,
    raw_token: &str,
) -> Result<Uuid, AuthError> {
    let now = Utc::now().naive_utc();
    let candidates = password_reset_token::Entity::find()
        .filter(password_reset_token::Column::Used.eq(false))
        .filter(password_reset_token::Column::ExpiresAt.gt(now))
        .all(conn)
        .await?;

    let raw = raw_token.to_string();
    let matched = tokio::task::spawn_blocking(move || {
        // A row with a corrupt hash must not block legitimate matches
        candidates
            .into_iter()
            .find(|row| verify_password(&raw, &row.token_hash).unwrap_or(false))
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?;

    let token_model = matched
        .ok_or_else(|| AuthError::BadRequest("Invalid or expired reset token".to_string()))?;
    let user_id = token_model.user_id;

    let mut active: password_reset_token::ActiveModel = token_model.into();
    active.used = Set(true);
    active.update(conn).await?;

    Ok(user_id)
}

/// Create an email-verification token. Returns the raw token.
pub async fn create_email_verification_token<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<String, AuthError> {
    let raw_token = generate_secure_token();
    let token_hash = hash_password_blocking(raw_token.clone()).await?;
    let now = Utc::now().naive_utc();

    let model = verification_token::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(token_hash),
        expires_at: Set(now + Duration::seconds(VERIFICATION_TOKEN_TTL_SECS)),
        used: Set(false),
        created_at: Set(now),
        ..Default::default()
    };
    model.insert(conn).await?;

    Ok(raw_token)
}

/// Consume an email-verification token. Same scan-and-match procedure as the
/// reset store. Returns the owning user's id.
pub async fn consume_email_verification_token<C: ConnectionTrait>(
    conn: &C,
    raw_token: &str,
) -> Result<Uuid, AuthError> {
    let now = Utc::now().naive_utc();
    let candidates = verification_token::Entity::find()
        .filter(verification_token::Column::Used.eq(false))
        .filter(verification_token::Column::ExpiresAt.gt(now))
        .all(conn)
        .await?;

    let raw = raw_token.to_string();
    let matched = tokio::task::spawn_blocking(move || {
        candidates
            .into_iter()
            .find(|row| verify_password(&raw, &row.token_hash).unwrap_or(false))
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?;

    let token_model = matched
        .ok_or_else(|| AuthError::BadRequest("Invalid or expired verification token".to_string()))?;
    let user_id = token_model.user_id;

    let mut active: verification_token::ActiveModel = token_model.into();
    active.used = Set(true);
    active.update(conn).await?;

    Ok(user_id)
}
