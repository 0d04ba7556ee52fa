use axum::{extract::State, response::Response, Json};
use tracing::info;

use crate::{
    auth::{AuthResponse, AuthUser, LoginRequest, RegisterRequest, UserProfile},
    errors::ServiceError,
    handlers::common::{created_response, AppJson},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    summary = "Register",
    description = "Create an account and receive a bearer token",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Role cannot be self-registered", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Response, ServiceError> {
    let response = state.auth.register(payload).await?;
    Ok(created_response(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ServiceError> {
    state.auth.login(payload).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    summary = "Current user",
    description = "Profile of the authenticated user with a company summary",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, ServiceError> {
    info!(user_id = %user.user_id, "profile requested");
    state.auth.profile(user.user_id).await.map(Json)
}
