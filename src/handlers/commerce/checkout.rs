use crate::{
    auth::AuthUser,
    handlers::common::created,
    services::commerce::{checkout_service::CheckoutRequest, OrderReceipt},
    ApiResponse, AppState,
};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};

/// Creates the router for checkout
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

/// Place an order from the cart
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    summary = "Checkout",
    description = "Converts the caller's cart into an order. Every prescription-only product \
                   must be covered by an approved prescription.",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderReceipt>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Cart is empty", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 422, description = "Prescription required; details lists the uncovered products",
            body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderReceipt>>), crate::errors::ServiceError> {
    let receipt = state
        .services
        .checkout
        .checkout(user.user_id, payload.payment_method)
        .await?;
    Ok(created(receipt))
}
