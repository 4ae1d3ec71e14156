use crate::{
    auth::AuthUser,
    entities::ProductRef,
    handlers::common::product_ref,
    services::commerce::{CartSnapshot, CartView},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for the caller's cart
pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart/items", post(add_to_cart))
        .route(
            "/cart/items/{kind}/{product_id}",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/cart/merge", post(merge_cart))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    summary = "Get cart",
    description = "The caller's cart with live prices and prescription coverage",
    responses(
        (status = 200, description = "Cart retrieved", body = ApiResponse<CartView>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn get_cart(State(state): State<AppState>, user: AuthUser) -> ApiResult<CartView> {
    let cart = state.services.cart.view(user.user_id).await?;
    Ok(Json(ApiResponse::success(cart)))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    summary = "Add to cart",
    description = "Adds a product; an existing line for the same product is incremented",
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddItemRequest>,
) -> ApiResult<CartView> {
    payload.validate()?;
    let cart = state
        .services
        .cart
        .add_item(user.user_id, payload.product, payload.quantity)
        .await?;
    Ok(Json(ApiResponse::success(cart)))
}

#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{kind}/{product_id}",
    summary = "Update cart item quantity",
    params(
        ("kind" = String, Path, description = "Product kind: general or pet"),
        ("product_id" = Uuid, Path, description = "Product ID"),
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not in cart", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, product_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> ApiResult<CartView> {
    let product = product_ref(&kind, product_id)?;
    let cart = state
        .services
        .cart
        .update_quantity(user.user_id, product, payload.quantity)
        .await?;
    Ok(Json(ApiResponse::success(cart)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{kind}/{product_id}",
    summary = "Remove cart item",
    params(
        ("kind" = String, Path, description = "Product kind: general or pet"),
        ("product_id" = Uuid, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<CartView>),
        (status = 404, description = "Product not in cart", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, product_id)): Path<(String, Uuid)>,
) -> ApiResult<CartView> {
    let product = product_ref(&kind, product_id)?;
    let cart = state.services.cart.remove_item(user.user_id, product).await?;
    Ok(Json(ApiResponse::success(cart)))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/merge",
    summary = "Merge anonymous cart",
    description = "Merges a client-held cart into the caller's persistent cart after login",
    request_body = CartSnapshot,
    responses(
        (status = 200, description = "Carts merged", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product in snapshot", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "cart"
)]
pub async fn merge_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(snapshot): Json<CartSnapshot>,
) -> ApiResult<CartView> {
    let cart = state
        .services
        .cart
        .merge_snapshot(user.user_id, snapshot)
        .await?;
    Ok(Json(ApiResponse::success(cart)))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddItemRequest {
    pub product: ProductRef,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 999))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}
