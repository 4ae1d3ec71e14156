use crate::{
    entities::{ProductKind, ProductRef},
    errors::ServiceError,
    ApiResponse,
};
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

/// Standard created response
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Parses the `{kind}` path segment used by cart item routes.
pub fn parse_product_kind(kind: &str) -> Result<ProductKind, ServiceError> {
    match kind.to_ascii_lowercase().as_str() {
        "general" => Ok(ProductKind::General),
        "pet" => Ok(ProductKind::Pet),
        other => Err(ServiceError::ValidationError(format!(
            "Unknown product kind: {other}"
        ))),
    }
}

pub fn product_ref(kind: &str, product_id: Uuid) -> Result<ProductRef, ServiceError> {
    Ok(ProductRef::new(parse_product_kind(kind)?, product_id))
}

/// Query for product search
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive name fragment
    #[serde(default)]
    pub q: String,
}
