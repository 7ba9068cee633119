use chrono::{Duration, Utc};
use pitchside_auth::models::password_reset_token;
use pitchside_auth::testing::SentEmailKind;
use pitchside_auth::TestApp;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

#[tokio::test]
async fn test_forget_password_is_non_enumerating() {
    let app = TestApp::new().await;

    app.register_and_verify("real@example.com", "Real User", "password123")
        .await;

    let for_existing = app
        .client
        .post(
            &app.url("/api/auth/forget-password"),
            &serde_json::json!({ "email": "real@example.com" }).to_string(),
        )
        .await;
    let for_missing = app
        .client
        .post(
            &app.url("/api/auth/forget-password"),
            &serde_json::json!({ "email": "ghost@example.com" }).to_string(),
        )
        .await;

    assert_eq!(for_existing.status, 200);
    assert_eq!(for_missing.status, 200);
    // Byte-identical responses, no observable branching on account existence
    assert_eq!(for_existing.body, for_missing.body);
}

#[tokio::test]
async fn test_forget_password_emails_existing_account_only() {
    let app = TestApp::new().await;

    app.register_and_verify("target@example.com", "Target", "password123")
        .await;
    let mails_before = app.mailer.sent().len();

    app.client
        .post(
            &app.url("/api/auth/forget-password"),
            &serde_json::json!({ "email": "target@example.com" }).to_string(),
        )
        .await;
    app.client
        .post(
            &app.url("/api/auth/forget-password"),
            &serde_json::json!({ "email": "ghost@example.com" }).to_string(),
        )
        .await;

    let sent = app.mailer.sent();
    // Exactly one new mail, to the real account
    assert_eq!(sent.len(), mails_before + 1);
    let reset_mail = sent.last().unwrap();
    assert_eq!(reset_mail.kind, SentEmailKind::PasswordReset);
    assert_eq!(reset_mail.to, "target@example.com");
}

#[tokio::test]
async fn test_reset_password_with_invalid_token_fails() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "token": "0000000000000000000000000000000000000000000000000000000000000000",
        "new_password": "newpassword123",
    });

    let res = app
        .client
        .post(&app.url("/api/auth/reset-password"), &body.to_string())
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.error()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_reset_password_full_flow() {
    let app = TestApp::new().await;

    app.register_and_verify("reset@example.com", "Resetter", "oldpassword1")
        .await;
    let (_access, old_refresh) = app.login("reset@example.com", "oldpassword1").await;

    app.client
        .post(
            &app.url("/api/auth/forget-password"),
            &serde_json::json!({ "email": "reset@example.com" }).to_string(),
        )
        .await;

    let token = app
        .last_token_for("reset@example.com", SentEmailKind::PasswordReset)
        .expect("No reset email recorded");

    let res = app
        .client
        .post(
            &app.url("/api/auth/reset-password"),
            &serde_json::json!({ "token": token, "new_password": "newpassword2" }).to_string(),
        )
        .await;
    assert_eq!(res.status, 200, "Reset failed: {}", res.body);

    // Old password no longer works
    let res = app
        .client
        .post(
            &app.url("/api/auth/login"),
            &serde_json::json!({ "email": "reset@example.com", "password": "oldpassword1" })
                .to_string(),
        )
        .await;
    assert_eq!(res.status, 401);

    // The stored refresh hash was cleared, outstanding sessions are dead
    let res = app
        .client
        .post(
            &app.url("/api/auth/refresh"),
            &serde_json::json!({ "refresh_token": old_refresh }).to_string(),
        )
        .await;
    assert_eq!(res.status, 401);

    // New password works
    app.login("reset@example.com", "newpassword2").await;
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let app = TestApp::new().await;

    app.register_and_verify("once@example.com", "Once", "password123")
        .await;
    app.client
        .post(
            &app.url("/api/auth/forget-password"),
            &serde_json::json!({ "email": "once@example.com" }).to_string(),
        )
        .await;

    let token = app
        .last_token_for("once@example.com", SentEmailKind::PasswordReset)
        .unwrap();

    let body =
        serde_json::json!({ "token": token, "new_password": "firstnewpass1" }).to_string();
    let res = app
        .client
        .post(&app.url("/api/auth/reset-password"), &body)
        .await;
    assert_eq!(res.status, 200);

    // Second consumption of the same plaintext must fail
    let body =
        serde_json::json!({ "token": token, "new_password": "secondnewpass2" }).to_string();
    let res = app
        .client
        .post(&app.url("/api/auth/reset-password"), &body)
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn test_expired_reset_token_fails() {
    let app = TestApp::new().await;

    app.register_and_verify("late@example.com", "Latecomer", "password123")
        .await;
    app.client
        .post(
            &app.url("/api/auth/forget-password"),
            &serde_json::json!({ "email": "late@example.com" }).to_string(),
        )
        .await;

    let token = app
        .last_token_for("late@example.com", SentEmailKind::PasswordReset)
        .unwrap();

    // Age the row past its 1-hour lifetime
    let row = password_reset_token::Entity::find()
        .one(&app.db)
        .await
        .unwrap()
        .expect("Reset token row should exist");
    let mut active: password_reset_token::ActiveModel = row.into();
    active.expires_at = Set((Utc::now() - Duration::hours(2)).naive_utc());
    active.update(&app.db).await.unwrap();

    let res = app
        .client
        .post(
            &app.url("/api/auth/reset-password"),
            &serde_json::json!({ "token": token, "new_password": "newpassword9" }).to_string(),
        )
        .await;
    assert_eq!(res.status, 400);

    // And the old password still logs in
    app.login("late@example.com", "password123").await;
}
