use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    entities::healthcare::doctor,
    services::healthcare::doctor_service::DoctorProfile,
    ApiResponse, ApiResult, AppState,
};

pub fn doctors_routes() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(list_doctors))
        .route("/doctors/{id}", get(get_doctor))
        .route("/vets", get(list_vets))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctors",
    summary = "List doctors",
    responses((status = 200, description = "Doctors", body = ApiResponse<Vec<doctor::Model>>)),
    tag = "doctors"
)]
pub async fn list_doctors(State(state): State<AppState>) -> ApiResult<Vec<doctor::Model>> {
    let doctors = state.services.doctors.list_doctors().await?;
    Ok(Json(ApiResponse::success(doctors)))
}

#[utoipa::path(
    get,
    path = "/api/v1/vets",
    summary = "List veterinarians",
    responses((status = 200, description = "Veterinarians", body = ApiResponse<Vec<doctor::Model>>)),
    tag = "doctors"
)]
pub async fn list_vets(State(state): State<AppState>) -> ApiResult<Vec<doctor::Model>> {
    let vets = state.services.doctors.list_vets().await?;
    Ok(Json(ApiResponse::success(vets)))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctors/{id}",
    summary = "Doctor profile",
    params(("id" = Uuid, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Profile with weekly schedule", body = ApiResponse<DoctorProfile>),
        (status = 404, description = "Doctor not found", body = crate::errors::ErrorResponse),
    ),
    tag = "doctors"
)]
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DoctorProfile> {
    let profile = state.services.doctors.get_profile(id).await?;
    Ok(Json(ApiResponse::success(profile)))
}
