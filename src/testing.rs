//! Integration-test harness: an in-process server over an in-memory SQLite
//! database, plus a recording mailer so tests can capture the one-time tokens
//! that production would deliver by email.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderMap;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;

use crate::app::App;
use crate::config::Config;
use crate::email::EmailSender;
use crate::error::AuthError;

/// Which template a recorded email used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentEmailKind {
    Verification,
    PasswordReset,
}

/// One captured outbound email.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub kind: SentEmailKind,
    pub to: String,
    pub name: String,
    pub token: String,
}

/// Test double for [`EmailSender`] that records instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, kind: SentEmailKind, to: &str, name: &str, token: &str) {
        self.sent.lock().unwrap().push(SentEmail {
            kind,
            to: to.to_string(),
            name: name.to_string(),
            token: token.to_string(),
        });
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), AuthError> {
        self.record(SentEmailKind::Verification, to, name, token);
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), AuthError> {
        self.record(SentEmailKind::PasswordReset, to, name, token);
        Ok(())
    }
}

/// A test application builder for integration testing.
///
/// Spins up the auth server with an in-memory SQLite database.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_register() {
///     let app = TestApp::new().await;
///     let res = app.client.post(&app.url("/api/auth/register"), r#"{...}"#).await;
///     assert_eq!(res.status, 200);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub mailer: RecordingMailer,
}

impl TestApp {
    /// Create a new test app with an in-memory SQLite database and a
    /// recording mailer.
    pub async fn new() -> Self {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret-key-for-testing".to_string(),
            access_token_ttl_mins: 15,
            refresh_token_ttl_days: 7,
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
            app_url: "http://localhost:3000".to_string(),
            email_host: "localhost".to_string(),
            email_port: 587,
            email_username: "test@pitchside.local".to_string(),
            email_password: String::new(),
            email_from: "test@pitchside.local".to_string(),
        };

        let mailer = RecordingMailer::new();
        let app = App::with_config(config, Arc::new(mailer.clone()))
            .await
            .expect("Failed to create test app");

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            db: app.db,
            config: app.config,
            mailer,
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register a player account and return the user projection.
    pub async fn register_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> serde_json::Value {
        let body = serde_json::json!({
            "email": email,
            "name": name,
            "password": password,
            "role": "player",
        });

        let res = self
            .client
            .post(&self.url("/api/auth/register"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Register failed: {}", res.body);
        res.data()["user"].clone()
    }

    /// The token carried by the most recent email of the given kind sent to
    /// this address.
    pub fn last_token_for(&self, email: &str, kind: SentEmailKind) -> Option<String> {
        self.mailer
            .sent()
            .iter()
            .rev()
            .find(|m| m.kind == kind && m.to == email)
            .map(|m| m.token.clone())
    }

    /// Verify an account using the token captured from its verification email.
    pub async fn verify_email(&self, email: &str) {
        let token = self
            .last_token_for(email, SentEmailKind::Verification)
            .expect("No verification email recorded");

        let body = serde_json::json!({ "token": token });
        let res = self
            .client
            .post(&self.url("/api/auth/verify-email"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Verify email failed: {}", res.body);
    }

    /// Register and immediately verify an account.
    pub async fn register_and_verify(&self, email: &str, name: &str, password: &str) {
        self.register_user(email, name, password).await;
        self.verify_email(email).await;
    }

    /// Login and return `(access_token, refresh_token)`.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let res = self
            .client
            .post(&self.url("/api/auth/login"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.body);

        let data = res.data();
        (
            data["access_token"].as_str().unwrap().to_string(),
            data["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

/// A simple HTTP test client with helper methods.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address.
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .get(url)
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request with auth token and JSON body.
    pub async fn post_with_auth(&self, url: &str, token: &str, body: &str) -> TestResponse {
        let res: reqwest::Response = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
    pub headers: HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = HeaderMap::new();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        let json = self.json();
        json["success"].as_bool().unwrap_or(false)
    }

    /// Get the data field from the response.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// Get the error field from the response.
    pub fn error(&self) -> serde_json::Value {
        self.json()["error"].clone()
    }
}
