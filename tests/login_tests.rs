use pitchside_auth::models::user;
use pitchside_auth::TestApp;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[tokio::test]
async fn test_login_before_verification_fails() {
    let app = TestApp::new().await;

    app.register_user("unverified@example.com", "Unverified", "password123")
        .await;

    let body = serde_json::json!({
        "email": "unverified@example.com",
        "password": "password123",
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert!(!res.is_success());
}

#[tokio::test]
async fn test_login_after_verification_succeeds() {
    let app = TestApp::new().await;

    app.register_and_verify("player@example.com", "Player One", "password123")
        .await;

    let body = serde_json::json!({
        "email": "player@example.com",
        "password": "password123",
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    assert!(res.is_success());

    let data = res.data();
    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert_eq!(data["user"]["email"], "player@example.com");
    assert!(data["user"]["password_hash"].is_null());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;

    app.register_and_verify("wrong@example.com", "Wrong PW", "password123")
        .await;

    let body = serde_json::json!({
        "email": "wrong@example.com",
        "password": "wrong_password",
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert!(!res.is_success());
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "email": "noone@example.com",
        "password": "password123",
    });

    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
    assert!(!res.is_success());
}

#[tokio::test]
async fn test_login_stores_refresh_token_hash() {
    let app = TestApp::new().await;

    app.register_and_verify("hash@example.com", "Hash Check", "password123")
        .await;
    let (_access, refresh) = app.login("hash@example.com", "password123").await;

    let user_model = user::Entity::find()
        .filter(user::Column::Email.eq("hash@example.com"))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    let stored = user_model.refresh_token_hash.expect("Hash should be stored");
    assert!(!stored.is_empty());
    // Only a hash of the refresh token is persisted, never the token itself
    assert_ne!(stored, refresh);
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn test_second_login_overwrites_stored_hash() {
    let app = TestApp::new().await;

    app.register_and_verify("twice@example.com", "Twice", "password123")
        .await;

    app.login("twice@example.com", "password123").await;
    let first_hash = stored_hash(&app, "twice@example.com").await;

    app.login("twice@example.com", "password123").await;
    let second_hash = stored_hash(&app, "twice@example.com").await;

    assert_ne!(first_hash, second_hash);
}

async fn stored_hash(app: &TestApp, email: &str) -> String {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .refresh_token_hash
        .expect("Hash should be stored")
}
