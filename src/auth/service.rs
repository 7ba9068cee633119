//! The auth orchestrator: coordinates the credential store, token issuer,
//! revocation ledger, and reset/verification token stores across the eight
//! account flows.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::jwt::{self, TokenPair};
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::{revocation, security_token};
use crate::config::Config;
use crate::email::EmailSender;
use crate::error::AuthError;
use crate::models::user::{self, UserResponse, UserRole};

// ── Request / Response types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// When supplied, the token is revoked into the ledger as well
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgetPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResendVerificationRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Sent whether or not the account exists; the two paths must stay
/// indistinguishable to prevent email enumeration.
const GENERIC_RESET_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";
const GENERIC_VERIFICATION_MESSAGE: &str =
    "If an account with that email exists, a verification email has been sent.";

/// Coordinates all account flows. Cheap to clone; handlers hold one inside
/// the shared app state.
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    config: Arc<Config>,
    mailer: Arc<dyn EmailSender>,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: Arc<Config>, mailer: Arc<dyn EmailSender>) -> Self {
        AuthService { db, config, mailer }
    }

    /// Register a new account. No tokens are issued; the account must verify
    /// its email and log in.
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AuthError> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(&req.email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password_blocking(req.password).await?;
        let now = Utc::now().naive_utc();

        // User creation and verification-token issuance commit together; a
        // crash in between would otherwise strand an unverifiable account.
        let txn = self.db.begin().await?;

        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(req.email),
            name: Set(req.name),
            role: Set(req.role),
            password_hash: Set(password_hash),
            bio: Set(req.bio),
            country: Set(req.country),
            date_of_birth: Set(req.date_of_birth),
            verified: Set(false),
            refresh_token_hash: Set(None),
            password_changed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The unique constraint on email is authoritative for concurrent
        // registrations that both pass the pre-check.
        let user_model = match new_user.insert(&txn).await {
            Ok(model) => model,
            Err(e) => {
                return Err(match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        AuthError::Conflict("Email already exists".to_string())
                    }
                    _ => AuthError::Database(e),
                });
            }
        };

        let token = security_token::create_email_verification_token(&txn, user_model.id).await?;
        txn.commit().await?;

        tracing::info!(user_id = %user_model.id, "user registered");

        self.mailer
            .send_verification_email(&user_model.email, &user_model.name, &token)
            .await?;

        Ok(RegisterResponse {
            message: "Registration successful. Please check your email to verify your account."
                .to_string(),
            user: UserResponse::from(user_model),
        })
    }

    /// Log in with email and password. Unknown accounts, unverified accounts,
    /// and bad passwords all fail with the same error class.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AuthError> {
        let user_model = user::Entity::find()
            .filter(user::Column::Email.eq(&req.email))
            .one(&self.db)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("Invalid credentials".to_string()))?;

        if !user_model.verified {
            return Err(AuthError::Unauthorized(
                "Please verify your email before logging in".to_string(),
            ));
        }

        let is_valid =
            verify_password_blocking(req.password, user_model.password_hash.clone()).await?;
        if !is_valid {
            return Err(AuthError::Unauthorized("Invalid credentials".to_string()));
        }

        let tokens = jwt::issue_token_pair(user_model.id, &self.config)?;
        self.store_refresh_token_hash(user_model.id, &tokens.refresh_token)
            .await?;

        tracing::debug!(user_id = %user_model.id, "login succeeded");

        Ok(LoginResponse {
            user: UserResponse::from(user_model),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Rotate a refresh token: the presented token is checked against the
    /// ledger and the stored hash, revoked, and replaced by a fresh pair.
    /// Refresh tokens are single-use.
    pub async fn refresh_token(
        &self,
        user_id: Uuid,
        raw_token: &str,
    ) -> Result<TokenPair, AuthError> {
        if revocation::is_revoked(&self.db, raw_token).await? {
            return Err(AuthError::Unauthorized(
                "Token has been revoked".to_string(),
            ));
        }

        let user_model = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("Invalid refresh token".to_string()))?;

        let stored_hash = user_model
            .refresh_token_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AuthError::Unauthorized("Invalid refresh token".to_string()))?
            .to_string();

        let is_valid = verify_password_blocking(raw_token.to_string(), stored_hash).await?;
        if !is_valid {
            return Err(AuthError::Unauthorized(
                "Invalid refresh token".to_string(),
            ));
        }

        revocation::revoke(&self.db, user_id, raw_token).await?;

        let tokens = jwt::issue_token_pair(user_id, &self.config)?;
        self.store_refresh_token_hash(user_id, &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    /// Log out: clear the stored refresh-token hash, revoke the presented
    /// token if any, and prune expired ledger rows. Always succeeds.
    pub async fn logout(
        &self,
        user_id: Uuid,
        raw_token: Option<&str>,
    ) -> Result<MessageResponse, AuthError> {
        self.clear_refresh_token_hash(&self.db, user_id).await?;

        if let Some(token) = raw_token {
            revocation::revoke(&self.db, user_id, token).await?;
        }

        let pruned = revocation::cleanup_expired(&self.db).await?;
        if pruned > 0 {
            tracing::debug!(pruned, "expired ledger rows removed");
        }

        Ok(MessageResponse {
            message: "Logged out successfully".to_string(),
        })
    }

    /// Start the password-reset flow. The response never reveals whether the
    /// account exists.
    pub async fn forget_password(&self, email: &str) -> Result<MessageResponse, AuthError> {
        let user_model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        let Some(user_model) = user_model else {
            return Ok(MessageResponse {
                message: GENERIC_RESET_MESSAGE.to_string(),
            });
        };

        let token = security_token::create_password_reset_token(&self.db, user_model.id).await?;
        self.mailer
            .send_password_reset_email(&user_model.email, &user_model.name, &token)
            .await?;

        Ok(MessageResponse {
            message: GENERIC_RESET_MESSAGE.to_string(),
        })
    }

    /// Complete the password-reset flow: match the presented token, rotate
    /// the password, and invalidate every outstanding session by clearing the
    /// stored refresh-token hash.
    pub async fn reset_password(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, AuthError> {
        let txn = self.db.begin().await?;

        let user_id = security_token::consume_password_reset_token(&txn, raw_token).await?;
        let password_hash = hash_password_blocking(new_password.to_string()).await?;
        let now = Utc::now().naive_utc();

        user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::PasswordChangedAt, Expr::value(now))
            .col_expr(user::Column::RefreshTokenHash, Expr::value(""))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(user_id = %user_id, "password reset, sessions invalidated");

        Ok(MessageResponse {
            message: "Password has been reset successfully".to_string(),
        })
    }

    /// Verify an email address with a token from the verification mail.
    pub async fn verify_email(&self, raw_token: &str) -> Result<MessageResponse, AuthError> {
        let txn = self.db.begin().await?;

        let user_id = security_token::consume_email_verification_token(&txn, raw_token).await?;

        user::Entity::update_many()
            .col_expr(user::Column::Verified, Expr::value(true))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(MessageResponse {
            message: "Email verified successfully".to_string(),
        })
    }

    /// Send a fresh verification token. Non-enumerating for unknown emails;
    /// an already-verified account is told so outright.
    pub async fn resend_verification_email(
        &self,
        email: &str,
    ) -> Result<MessageResponse, AuthError> {
        let user_model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        let Some(user_model) = user_model else {
            return Ok(MessageResponse {
                message: GENERIC_VERIFICATION_MESSAGE.to_string(),
            });
        };

        if user_model.verified {
            return Err(AuthError::BadRequest(
                "Email is already verified".to_string(),
            ));
        }

        let token =
            security_token::create_email_verification_token(&self.db, user_model.id).await?;
        self.mailer
            .send_verification_email(&user_model.email, &user_model.name, &token)
            .await?;

        Ok(MessageResponse {
            message: GENERIC_VERIFICATION_MESSAGE.to_string(),
        })
    }

    /// Hash a refresh token and store it as the user's current one,
    /// overwriting any prior value.
    async fn store_refresh_token_hash(
        &self,
        user_id: Uuid,
        raw_token: &str,
    ) -> Result<(), AuthError> {
        let token_hash = hash_password_blocking(raw_token.to_string()).await?;

        user::Entity::update_many()
            .col_expr(user::Column::RefreshTokenHash, Expr::value(token_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Clear the stored refresh-token hash (empty string = logged out).
    async fn clear_refresh_token_hash<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<(), AuthError> {
        user::Entity::update_many()
            .col_expr(user::Column::RefreshTokenHash, Expr::value(""))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(user::Column::Id.eq(user_id))
            .exec(conn)
            .await?;

        Ok(())
    }
}
