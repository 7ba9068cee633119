//! The full account lifecycle, end to end:
//! register → verify-email → login → refresh → logout → stale refresh fails.

use pitchside_auth::models::revoked_token;
use pitchside_auth::testing::SentEmailKind;
use pitchside_auth::TestApp;
use sea_orm::EntityTrait;

#[tokio::test]
async fn test_full_account_lifecycle() {
    let app = TestApp::new().await;

    // Register: no tokens yet
    let body = serde_json::json!({
        "email": "striker@example.com",
        "name": "Striker Nine",
        "password": "password123",
        "role": "player",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 200);
    assert!(res.data()["access_token"].is_null());

    // Login blocked until verification
    let login_body = serde_json::json!({
        "email": "striker@example.com",
        "password": "password123",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &login_body.to_string())
        .await;
    assert_eq!(res.status, 401);

    // Verify with the token captured from the issuance step
    let token = app
        .last_token_for("striker@example.com", SentEmailKind::Verification)
        .expect("No verification email recorded");
    let res = app
        .client
        .post(
            &app.url("/api/auth/verify-email"),
            &serde_json::json!({ "token": token }).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);

    // Login now succeeds
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &login_body.to_string())
        .await;
    assert_eq!(res.status, 200);
    let first_refresh = res.data()["refresh_token"].as_str().unwrap().to_string();

    // Refresh rotates the pair
    let res = app
        .client
        .post(
            &app.url("/api/auth/refresh"),
            &serde_json::json!({ "refresh_token": first_refresh }).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);
    let access = res.data()["access_token"].as_str().unwrap().to_string();
    let second_refresh = res.data()["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(first_refresh, second_refresh);

    // Logout, presenting the live refresh token
    let res = app
        .client
        .post_with_auth(
            &app.url("/api/auth/logout"),
            &access,
            &serde_json::json!({ "refresh_token": second_refresh }).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);

    // Neither the rotated-away token nor the logged-out one refreshes
    for stale in [&first_refresh, &second_refresh] {
        let res = app
            .client
            .post(
                &app.url("/api/auth/refresh"),
                &serde_json::json!({ "refresh_token": stale }).to_string(),
            )
            .await;
        assert_eq!(res.status, 401, "Stale token must not refresh");
    }

    // The ledger holds both revocations (nothing expired yet, so cleanup
    // removed nothing)
    let ledger = revoked_token::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(ledger.len(), 2);
}

#[tokio::test]
async fn test_sessions_are_per_account() {
    let app = TestApp::new().await;

    app.register_and_verify("alice@example.com", "Alice", "password123")
        .await;
    app.register_and_verify("bob@example.com", "Bob", "password456")
        .await;

    let (_alice_access, alice_refresh) = app.login("alice@example.com", "password123").await;
    let (bob_access, _bob_refresh) = app.login("bob@example.com", "password456").await;

    // Bob logging out does not touch Alice's session
    app.client
        .post_with_auth(&app.url("/api/auth/logout"), &bob_access, "{}")
        .await;

    let res = app
        .client
        .post(
            &app.url("/api/auth/refresh"),
            &serde_json::json!({ "refresh_token": alice_refresh }).to_string(),
        )
        .await;
    assert_eq!(res.status, 200, "Alice's session should survive: {}", res.body);
}
