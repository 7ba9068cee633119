use utoipa::OpenApi;

use crate::auth::jwt::TokenPair;
use crate::auth::service::{
    ForgetPasswordRequest, LoginRequest, LoginResponse, LogoutRequest, MessageResponse,
    RefreshRequest, RegisterRequest, RegisterResponse, ResendVerificationRequest,
    ResetPasswordRequest, VerifyEmailRequest,
};
use crate::models::user::UserResponse;

/// Auto-generated OpenAPI documentation for the auth endpoints.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pitchside Auth API",
        version = "0.1.0",
        description = "Authentication and token lifecycle for the Pitchside scouting platform."
    ),
    paths(
        crate::controllers::auth::register,
        crate::controllers::auth::login,
        crate::controllers::auth::refresh,
        crate::controllers::auth::logout,
        crate::controllers::auth::forget_password,
        crate::controllers::auth::reset_password,
        crate::controllers::auth::verify_email,
        crate::controllers::auth::resend_verification,
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            LogoutRequest,
            ForgetPasswordRequest,
            ResetPasswordRequest,
            VerifyEmailRequest,
            ResendVerificationRequest,
            MessageResponse,
            TokenPair,
            UserResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
