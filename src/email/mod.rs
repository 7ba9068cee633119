pub mod smtp;

pub use smtp::SmtpMailer;

use async_trait::async_trait;

use crate::error::AuthError;

/// Outbound email delivery, as seen by the auth orchestrator: fire a message
/// carrying the one-time plaintext token at a recipient. Delivery failures
/// propagate to the caller.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_verification_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), AuthError>;

    async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), AuthError>;
}
