use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    entities::healthcare::prescription,
    errors::ServiceError,
    handlers::common::created,
    services::healthcare::prescription_service::{PrescriptionDetail, ReviewDecision, ReviewOutcome},
    ApiResponse, ApiResult, AppState,
};

pub fn prescriptions_routes() -> Router<AppState> {
    Router::new()
        .route("/prescriptions", post(upload_prescription).get(list_prescriptions))
        .route("/prescriptions/pending", get(pending_prescriptions))
        .route("/prescriptions/{id}/review", post(review_prescription))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UploadPrescriptionRequest {
    /// Reference to the stored prescription image
    #[validate(length(min = 1, max = 500))]
    pub image_ref: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewPrescriptionRequest {
    pub decision: ReviewDecision,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Upload a prescription for the restricted products in the cart
#[utoipa::path(
    post,
    path = "/api/v1/prescriptions",
    summary = "Upload prescription",
    description = "Creates a pending prescription covering every prescription-only product currently in the cart",
    request_body = UploadPrescriptionRequest,
    responses(
        (status = 201, description = "Prescription uploaded", body = ApiResponse<PrescriptionDetail>),
        (status = 400, description = "No restricted products in the cart", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "prescriptions"
)]
pub async fn upload_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UploadPrescriptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PrescriptionDetail>>), ServiceError> {
    payload.validate()?;
    let detail = state
        .services
        .prescriptions
        .upload(user.user_id, payload.image_ref)
        .await?;
    Ok(created(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/prescriptions",
    summary = "List my prescriptions",
    responses(
        (status = 200, description = "Prescriptions, newest first", body = ApiResponse<Vec<prescription::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "prescriptions"
)]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<prescription::Model>> {
    let prescriptions = state.services.prescriptions.list_mine(user.user_id).await?;
    Ok(Json(ApiResponse::success(prescriptions)))
}

#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/pending",
    summary = "Pending review queue",
    responses(
        (status = 200, description = "Pending prescriptions, oldest first", body = ApiResponse<Vec<PrescriptionDetail>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not clinical staff", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "prescriptions"
)]
pub async fn pending_prescriptions(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<PrescriptionDetail>> {
    let queue = state.services.prescriptions.pending_queue(&user).await?;
    Ok(Json(ApiResponse::success(queue)))
}

#[utoipa::path(
    post,
    path = "/api/v1/prescriptions/{id}/review",
    summary = "Review prescription",
    description = "Approve or reject a pending prescription. Rejection removes the covered products from the patient's cart.",
    params(("id" = Uuid, Path, description = "Prescription ID")),
    request_body = ReviewPrescriptionRequest,
    responses(
        (status = 200, description = "Prescription reviewed", body = ApiResponse<ReviewOutcome>),
        (status = 400, description = "Already reviewed", body = crate::errors::ErrorResponse),
        (status = 403, description = "No doctor profile", body = crate::errors::ErrorResponse),
        (status = 404, description = "Prescription not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "prescriptions"
)]
pub async fn review_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewPrescriptionRequest>,
) -> ApiResult<ReviewOutcome> {
    payload.validate()?;
    let outcome = state
        .services
        .prescriptions
        .review(&user, id, payload.decision, payload.notes)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
