use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Config;
use crate::email::EmailSender;
use crate::error::AuthError;

/// SMTP-backed mailer. Builds and sends each message on the blocking pool;
/// lettre's synchronous transport would otherwise stall the async executor.
pub struct SmtpMailer {
    config: Arc<Config>,
}

impl SmtpMailer {
    pub fn new(config: Arc<Config>) -> Self {
        SmtpMailer { config }
    }

    async fn send(&self, to: String, subject: String, body: String) -> Result<(), AuthError> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || send_blocking(&config, &to, &subject, body))
            .await
            .map_err(|e| AuthError::Internal(format!("Email task failed: {}", e)))?
    }
}

fn send_blocking(config: &Config, to: &str, subject: &str, body: String) -> Result<(), AuthError> {
    let email = Message::builder()
        .from(
            format!("Pitchside <{}>", config.email_from)
                .parse()
                .map_err(|e| AuthError::Internal(format!("Invalid from address: {}", e)))?,
        )
        .to(to
            .parse()
            .map_err(|e| AuthError::Internal(format!("Invalid to address: {}", e)))?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| AuthError::Internal(format!("Failed to create email: {}", e)))?;

    let mailer = SmtpTransport::starttls_relay(&config.email_host)
        .map_err(|e| AuthError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        .credentials(Credentials::new(
            config.email_username.clone(),
            config.email_password.clone(),
        ))
        .port(config.email_port)
        .timeout(Some(Duration::from_secs(10)))
        .build();

    mailer
        .send(&email)
        .map(|_| ())
        .map_err(|e| AuthError::Internal(format!("Failed to send email: {}", e)))
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), AuthError> {
        let verification_url = format!("{}/auth/verify-email?token={}", self.config.app_url, token);
        let body = format!(
            "Hi {name},\n\
            \n\
            Welcome to Pitchside! Please verify your email address by opening the link below:\n\
            \n\
            {verification_url}\n\
            \n\
            This link will expire in 24 hours.\n\
            \n\
            If you didn't create an account, please ignore this email.\n",
        );

        self.send(
            to.to_string(),
            "Verify Your Email - Pitchside".to_string(),
            body,
        )
        .await
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), AuthError> {
        let reset_url = format!("{}/auth/reset-password?token={}", self.config.app_url, token);
        let body = format!(
            "Hi {name},\n\
            \n\
            We received a request to reset your password. Open the link below to choose a new one:\n\
            \n\
            {reset_url}\n\
            \n\
            This link will expire in 1 hour.\n\
            \n\
            If you didn't request a password reset, please ignore this email.\n",
        );

        self.send(
            to.to_string(),
            "Reset Your Password - Pitchside".to_string(),
            body,
        )
        .await
    }
}
