//! Append-only ledger of revoked refresh tokens.
//!
//! Rows outlive the tokens they block only until the token's own expiry;
//! [`cleanup_expired`] prunes them opportunistically from the logout path.
//! There is no background job.

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::auth::jwt;
use crate::auth::password::{hash_password_blocking, verify_password};
use crate::error::AuthError;
use crate::models::revoked_token;

/// Ledger rows for tokens whose exp claim cannot be read are kept this long.
const FALLBACK_TTL_DAYS: i64 = 7;

/// Record a refresh token as revoked. The row expires when the token itself
/// would have, falling back to now + 7d when the exp claim is unreadable.
pub async fn revoke<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    raw_token: &str,
) -> Result<(), AuthError> {
    let expires_at = jwt::decode_expiry(raw_token)
        .unwrap_or_else(|| (Utc::now() + Duration::days(FALLBACK_TTL_DAYS)).naive_utc());
    let token_hash = hash_password_blocking(raw_token.to_string()).await?;

    let model = revoked_token::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(token_hash),
        expires_at: Set(expires_at),
        revoked_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    model.insert(conn).await?;

    Ok(())
}

/// Check whether a refresh token has been revoked, by hash-comparing it
/// against every unexpired ledger row. A row with a corrupt hash counts as
/// no-match rather than failing the whole check.
pub async fn is_revoked<C: ConnectionTrait>(conn: &C, raw_token: &str) -> Result<bool, AuthError> {
    let now = Utc::now().naive_utc();
    let candidates = revoked_token::Entity::find()
        .filter(revoked_token::Column::ExpiresAt.gt(now))
        .all(conn)
        .await?;

    let raw = raw_token.to_string();
    tokio::task::spawn_blocking(move || {
        candidates
            .iter()
            .any(|row| verify_password(&raw, &row.token_hash).unwrap_or(false))
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))
}

/// Delete ledger rows past their expiry. Returns the number of rows pruned.
pub async fn cleanup_expired<C: ConnectionTrait>(conn: &C) -> Result<u64, AuthError> {
    let res = revoked_token::Entity::delete_many()
        .filter(revoked_token::Column::ExpiresAt.lte(Utc::now().naive_utc()))
        .exec(conn)
        .await?;

    Ok(res.rows_affected)
}
