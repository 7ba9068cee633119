use chrono::{Duration, Utc};
use pitchside_auth::auth::{jwt, revocation};
use pitchside_auth::models::revoked_token;
use pitchside_auth::TestApp;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

#[tokio::test]
async fn test_revoke_then_is_revoked() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();

    let token = jwt::create_token(
        &user_id.to_string(),
        &app.config.jwt_secret,
        Duration::days(7),
    )
    .unwrap();

    assert!(!revocation::is_revoked(&app.db, &token).await.unwrap());

    revocation::revoke(&app.db, user_id, &token).await.unwrap();

    assert!(revocation::is_revoked(&app.db, &token).await.unwrap());
}

#[tokio::test]
async fn test_ledger_row_carries_token_expiry() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();

    let token = jwt::create_token(
        &user_id.to_string(),
        &app.config.jwt_secret,
        Duration::days(3),
    )
    .unwrap();
    let expected = jwt::decode_expiry(&token).unwrap();

    revocation::revoke(&app.db, user_id, &token).await.unwrap();

    let row = revoked_token::Entity::find()
        .one(&app.db)
        .await
        .unwrap()
        .expect("Ledger row should exist");
    assert_eq!(row.expires_at, expected);
    assert_eq!(row.user_id, user_id);
    // The ledger stores a hash, never the plaintext
    assert_ne!(row.token_hash, token);
    assert!(row.token_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_undecodable_token_gets_fallback_expiry() {
    let app = TestApp::new().await;
    // One second of slack on each side for timestamp roundtrip precision
    let before = (Utc::now() + Duration::days(7) - Duration::seconds(1)).naive_utc();

    revocation::revoke(&app.db, Uuid::new_v4(), "opaque-not-a-jwt")
        .await
        .unwrap();

    let after = (Utc::now() + Duration::days(7) + Duration::seconds(1)).naive_utc();
    let row = revoked_token::Entity::find()
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    assert!(row.expires_at >= before && row.expires_at <= after);
}

#[tokio::test]
async fn test_unrevoked_token_is_not_flagged() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();

    let revoked = jwt::create_token(
        &user_id.to_string(),
        &app.config.jwt_secret,
        Duration::days(7),
    )
    .unwrap();
    let other = jwt::create_token(
        &user_id.to_string(),
        &app.config.jwt_secret,
        Duration::days(7),
    )
    .unwrap();

    revocation::revoke(&app.db, user_id, &revoked).await.unwrap();

    assert!(!revocation::is_revoked(&app.db, &other).await.unwrap());
}

#[tokio::test]
async fn test_cleanup_prunes_only_expired_rows() {
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();

    // 3 days, so the row is distinguishable from the 7-day fallback row below
    let live = jwt::create_token(
        &user_id.to_string(),
        &app.config.jwt_secret,
        Duration::days(3),
    )
    .unwrap();
    revocation::revoke(&app.db, user_id, &live).await.unwrap();
    revocation::revoke(&app.db, user_id, "stale-token")
        .await
        .unwrap();

    // Age the second row past its expiry
    let rows = revoked_token::Entity::find().all(&app.db).await.unwrap();
    let stale_row = rows
        .iter()
        .find(|r| jwt::decode_expiry(&live).unwrap() != r.expires_at)
        .unwrap()
        .clone();
    let mut active: revoked_token::ActiveModel = stale_row.into();
    active.expires_at = Set((Utc::now() - Duration::minutes(1)).naive_utc());
    active.update(&app.db).await.unwrap();

    let pruned = revocation::cleanup_expired(&app.db).await.unwrap();
    assert_eq!(pruned, 1);

    let remaining = revoked_token::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    // The live revocation still blocks its token
    assert!(revocation::is_revoked(&app.db, &live).await.unwrap());
}

#[tokio::test]
async fn test_expired_ledger_row_no_longer_blocks() {
    // A row past expiresAt is logically prunable: the scan skips it even
    // before cleanup runs
    let app = TestApp::new().await;
    let user_id = Uuid::new_v4();

    revocation::revoke(&app.db, user_id, "short-lived")
        .await
        .unwrap();

    let row = revoked_token::Entity::find()
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: revoked_token::ActiveModel = row.into();
    active.expires_at = Set((Utc::now() - Duration::minutes(1)).naive_utc());
    active.update(&app.db).await.unwrap();

    assert!(!revocation::is_revoked(&app.db, "short-lived").await.unwrap());
}
