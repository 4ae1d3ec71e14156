use crate::{
    auth::AuthUser, entities::commerce::order, services::commerce::OrderReceipt, ApiResponse,
    ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::get,
    Router,
};
use uuid::Uuid;

pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "The caller's orders, newest first",
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<Vec<order::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<order::Model>> {
    let orders = state.services.orders.list_orders(user.user_id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its item snapshots", body = ApiResponse<OrderReceipt>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderReceipt> {
    let receipt = state.services.orders.get_order(user.user_id, id).await?;
    Ok(Json(ApiResponse::success(receipt)))
}
