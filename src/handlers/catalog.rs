use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    entities::catalog::{category, pet_category, pet_product, product},
    handlers::common::SearchParams,
    ApiResponse, ApiResult, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    summary = "List categories",
    responses(
        (status = 200, description = "Medicine and healthcare categories", body = ApiResponse<Vec<category::Model>>),
    ),
    tag = "catalog"
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<category::Model>> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/products",
    summary = "Products in a category",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<Vec<product::Model>>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn category_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<product::Model>> {
    let products = state.services.catalog.products_in_category(id).await?;
    Ok(Json(ApiResponse::success(products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    summary = "Get product",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = ApiResponse<product::Model>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<product::Model> {
    let product = state.services.catalog.get_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/search",
    summary = "Search products",
    description = "Case-insensitive substring match on product names",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching products", body = ApiResponse<Vec<product::Model>>),
    ),
    tag = "catalog"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<product::Model>> {
    let products = state.services.catalog.search_products(&params.q).await?;
    Ok(Json(ApiResponse::success(products)))
}

#[utoipa::path(
    get,
    path = "/api/v1/pet-categories",
    summary = "List pet categories",
    responses(
        (status = 200, description = "Pet shop categories", body = ApiResponse<Vec<pet_category::Model>>),
    ),
    tag = "catalog"
)]
pub async fn list_pet_categories(
    State(state): State<AppState>,
) -> ApiResult<Vec<pet_category::Model>> {
    let categories = state.services.catalog.list_pet_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

#[utoipa::path(
    get,
    path = "/api/v1/pet-categories/{id}/products",
    summary = "Pet products in a category",
    params(("id" = Uuid, Path, description = "Pet category ID")),
    responses(
        (status = 200, description = "Pet products retrieved", body = ApiResponse<Vec<pet_product::Model>>),
        (status = 404, description = "Pet category not found", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn pet_category_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<pet_product::Model>> {
    let products = state.services.catalog.pet_products_in_category(id).await?;
    Ok(Json(ApiResponse::success(products)))
}
