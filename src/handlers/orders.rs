use axum::{
    extract::State,
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{created_response, AppJson, AppPath, AppQuery},
    services::orders::{CreateOrderRequest, OrderFilter, OrderResponse, UpdateOrderRequest},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    description = "Prices the items from the catalog, adds VAT and the delivery fee",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Buyer or material not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order number collision", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.create_order(&user, payload).await?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    params(OrderFilter),
    responses(
        (status = 200, description = "Orders newest first", body = [OrderResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<OrderFilter>,
) -> Result<Json<Vec<OrderResponse>>, ServiceError> {
    state.services.orders.list_orders(filter).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items and buyer", body = OrderResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<OrderResponse>, ServiceError> {
    state.services.orders.get_order(id).await.map(Json)
}

#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    summary = "Update order",
    description = "Delivery details, notes and payment status. A new delivery fee recomputes the total.",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ServiceError> {
    state.services.orders.update_order(id, payload).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/confirm",
    summary = "Confirm order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order confirmed", body = OrderResponse),
        (status = 400, description = "Order is not pending", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<OrderResponse>, ServiceError> {
    state.services.orders.confirm_order(id).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    summary = "Cancel order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 400, description = "Order already delivered or completed", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<OrderResponse>, ServiceError> {
    state.services.orders.cancel_order(id).await.map(Json)
}
