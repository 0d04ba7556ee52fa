use axum::{
    extract::State,
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{AuthUser, OptionalAuthUser},
    errors::ServiceError,
    handlers::common::{created_response, AppJson, AppPath, AppQuery},
    services::skip_hire::{
        CreateSkipHireRequest, SkipHireFilter, SkipHireResponse, UpdateSkipHireStatusRequest,
    },
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/skip-hire",
    summary = "Book a skip",
    description = "Guests may book. With a bearer token the booking is linked to the caller.",
    request_body = CreateSkipHireRequest,
    responses(
        (status = 201, description = "Booking created", body = SkipHireResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid token", body = crate::errors::ErrorResponse),
    ),
    tag = "skip-hire"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    AppJson(payload): AppJson<CreateSkipHireRequest>,
) -> Result<Response, ServiceError> {
    let booking = state
        .services
        .skip_hire
        .create_booking(user.as_ref(), payload)
        .await?;
    Ok(created_response(booking))
}

#[utoipa::path(
    get,
    path = "/api/v1/skip-hire",
    summary = "List all bookings",
    params(SkipHireFilter),
    responses(
        (status = 200, description = "Bookings newest first", body = [SkipHireResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Administrators only", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "skip-hire"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<SkipHireFilter>,
) -> Result<Json<Vec<SkipHireResponse>>, ServiceError> {
    state.services.skip_hire.list_bookings(filter).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/skip-hire/my",
    summary = "My bookings",
    responses(
        (status = 200, description = "Caller's bookings newest first", body = [SkipHireResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "skip-hire"
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<SkipHireResponse>>, ServiceError> {
    state
        .services
        .skip_hire
        .list_for_user(user.user_id)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/skip-hire/number/{order_number}",
    summary = "Get booking by number",
    params(("order_number" = String, Path, description = "Booking number, e.g. SKP241000001")),
    responses(
        (status = 200, description = "Booking", body = SkipHireResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
    ),
    tag = "skip-hire"
)]
pub async fn get_booking_by_number(
    State(state): State<AppState>,
    AppPath(order_number): AppPath<String>,
) -> Result<Json<SkipHireResponse>, ServiceError> {
    state
        .services
        .skip_hire
        .get_by_number(&order_number)
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/skip-hire/{id}",
    summary = "Get booking",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = SkipHireResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
    ),
    tag = "skip-hire"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SkipHireResponse>, ServiceError> {
    state.services.skip_hire.get_booking(id).await.map(Json)
}

#[utoipa::path(
    patch,
    path = "/api/v1/skip-hire/{id}/status",
    summary = "Update booking status",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateSkipHireStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SkipHireResponse),
        (status = 400, description = "Booking is completed or cancelled", body = crate::errors::ErrorResponse),
        (status = 403, description = "Administrators only", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "skip-hire"
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateSkipHireStatusRequest>,
) -> Result<Json<SkipHireResponse>, ServiceError> {
    state
        .services
        .skip_hire
        .update_status(id, payload.status)
        .await
        .map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/skip-hire/{id}/cancel",
    summary = "Cancel booking",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = SkipHireResponse),
        (status = 400, description = "Booking already collected or completed", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "skip-hire"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SkipHireResponse>, ServiceError> {
    state
        .services
        .skip_hire
        .cancel_booking(&user, id)
        .await
        .map(Json)
}
