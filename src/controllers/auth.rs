use axum::{extract::State, routing::post, Router};
use uuid::Uuid;
use validator::Validate;

use crate::auth::jwt::{self, TokenPair};
use crate::auth::service::{
    ForgetPasswordRequest, LoginRequest, LoginResponse, LogoutRequest, MessageResponse,
    RefreshRequest, RegisterRequest, RegisterResponse, ResendVerificationRequest,
    ResetPasswordRequest, VerifyEmailRequest,
};
use crate::error::AuthError;
use crate::extractors::{AuthUser, Json};
use crate::response::ApiResponse;

use super::AppState;

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/forget-password", post(forget_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/verify-email", post(verify_email))
        .route("/api/auth/resend-verification", post(resend_verification))
}

// ── Handlers ──

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, verification email sent", body = ApiResponse<RegisterResponse>),
        (status = 409, description = "Email already exists"),
        (status = 422, description = "Invalid input")
    ),
    tag = "auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<RegisterResponse>, AuthError> {
    payload.validate()?;
    let res = state.auth.register(payload).await?;
    Ok(ApiResponse::success(res))
}

/// Log in with existing credentials.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials or unverified account")
    ),
    tag = "auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AuthError> {
    payload.validate()?;
    let res = state.auth.login(payload).await?;
    Ok(ApiResponse::success(res))
}

/// Exchange a refresh token for a fresh pair (rotation).
///
/// The presented token authenticates the request: its signature and expiry
/// identify the subject before the orchestrator applies the ledger and
/// stored-hash checks.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid, revoked, or replayed refresh token")
    ),
    tag = "auth"
)]
pub(crate) async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<ApiResponse<TokenPair>, AuthError> {
    let claims = jwt::validate_token(&payload.refresh_token, &state.config.jwt_secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthError::Unauthorized("Invalid refresh token".to_string()))?;

    let tokens = state
        .auth
        .refresh_token(user_id, &payload.refresh_token)
        .await?;
    Ok(ApiResponse::success(tokens))
}

/// Log out: clear the stored refresh token and revoke the presented one.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<MessageResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LogoutRequest>,
) -> Result<ApiResponse<MessageResponse>, AuthError> {
    let res = state
        .auth
        .logout(user_id, payload.refresh_token.as_deref())
        .await?;
    Ok(ApiResponse::success(res))
}

/// Request a password reset. The response is identical whether or not the
/// account exists.
#[utoipa::path(
    post,
    path = "/api/auth/forget-password",
    request_body = ForgetPasswordRequest,
    responses(
        (status = 200, description = "Generic acknowledgement", body = ApiResponse<MessageResponse>),
    ),
    tag = "auth"
)]
pub(crate) async fn forget_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgetPasswordRequest>,
) -> Result<ApiResponse<MessageResponse>, AuthError> {
    payload.validate()?;
    let res = state.auth.forget_password(&payload.email).await?;
    Ok(ApiResponse::success(res))
}

/// Reset the password with a token from the reset email.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid, expired, or used token")
    ),
    tag = "auth"
)]
pub(crate) async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ApiResponse<MessageResponse>, AuthError> {
    payload.validate()?;
    let res = state
        .auth
        .reset_password(&payload.token, &payload.new_password)
        .await?;
    Ok(ApiResponse::success(res))
}

/// Verify an email address with a token from the verification email.
#[utoipa::path(
    post,
    path = "/api/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid, expired, or used token")
    ),
    tag = "auth"
)]
pub(crate) async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<ApiResponse<MessageResponse>, AuthError> {
    let res = state.auth.verify_email(&payload.token).await?;
    Ok(ApiResponse::success(res))
}

/// Resend the verification email. Identical response whether or not the
/// account exists; already-verified accounts get a BadRequest.
#[utoipa::path(
    post,
    path = "/api/auth/resend-verification",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Generic acknowledgement", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Email already verified")
    ),
    tag = "auth"
)]
pub(crate) async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<ApiResponse<MessageResponse>, AuthError> {
    payload.validate()?;
    let res = state
        .auth
        .resend_verification_email(&payload.email)
        .await?;
    Ok(ApiResponse::success(res))
}
