use serde::Deserialize;
use thiserror::Error;

/// Startup configuration failure. Not recoverable per-request; the process
/// must refuse to boot without a signing secret.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not configured")]
    MissingJwtSecret,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://pitchside.db, postgres://...)
    pub database_url: String,

    /// JWT signing secret. Required; startup aborts without it.
    pub jwt_secret: String,

    /// Access token expiry in minutes (default: 15)
    pub access_token_ttl_mins: u64,

    /// Refresh token expiry in days (default: 7)
    pub refresh_token_ttl_days: u64,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Outward-facing base URL used to build links embedded in emails
    pub app_url: String,

    /// SMTP server hostname
    pub email_host: String,

    /// SMTP server port (typically 587 for STARTTLS)
    pub email_port: u16,

    /// SMTP username
    pub email_username: String,

    /// SMTP password (app password for Gmail)
    pub email_password: String,

    /// From address for outgoing mail (defaults to the SMTP username)
    pub email_from: String,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }

        let email_username = std::env::var("EMAIL_USER").unwrap_or_default();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://pitchside.db?mode=rwc".to_string()),
            jwt_secret,
            access_token_ttl_mins: std::env::var("ACCESS_TOKEN_TTL_MINS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
            refresh_token_ttl_days: std::env::var("REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap_or(7),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            email_host: std::env::var("EMAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            email_port: std::env::var("EMAIL_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            email_from: std::env::var("EMAIL_FROM").unwrap_or_else(|_| email_username.clone()),
            email_username,
            email_password: std::env::var("EMAIL_PASSWORD").unwrap_or_default(),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
