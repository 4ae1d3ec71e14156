use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::healthcare::elab_schedule,
    errors::ServiceError,
    handlers::common::created,
    services::healthcare::elab_service::{
        LabPaymentRequest, LabReportRequest, LabTest, ScheduleLabTestRequest,
    },
    ApiResponse, ApiResult, AppState,
};

pub fn elab_routes() -> Router<AppState> {
    Router::new()
        .route("/elab/tests", get(list_tests))
        .route("/elab/schedules", post(schedule_test).get(my_schedules))
        .route("/elab/schedules/{id}/pay", post(pay_schedule))
        .route("/elab/schedules/{id}/report", post(upload_report))
        .route("/elab/all", get(all_schedules))
}

#[utoipa::path(
    get,
    path = "/api/v1/elab/tests",
    summary = "Available lab tests",
    responses((status = 200, description = "Tests with category and price", body = ApiResponse<Vec<LabTest>>)),
    tag = "elab"
)]
pub async fn list_tests(State(state): State<AppState>) -> ApiResult<Vec<LabTest>> {
    Ok(Json(ApiResponse::success(state.services.elab.list_tests().to_vec())))
}

#[utoipa::path(
    post,
    path = "/api/v1/elab/schedules",
    summary = "Schedule a lab test",
    description = "Category and price are derived from the test name",
    request_body = ScheduleLabTestRequest,
    responses(
        (status = 201, description = "Lab test scheduled", body = ApiResponse<elab_schedule::Model>),
        (status = 400, description = "Unknown test or missing details", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "elab"
)]
pub async fn schedule_test(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ScheduleLabTestRequest>,
) -> Result<(StatusCode, Json<ApiResponse<elab_schedule::Model>>), ServiceError> {
    let booking = state.services.elab.schedule(user.user_id, payload).await?;
    Ok(created(booking))
}

#[utoipa::path(
    get,
    path = "/api/v1/elab/schedules",
    summary = "My lab bookings",
    responses((status = 200, description = "Bookings, newest first", body = ApiResponse<Vec<elab_schedule::Model>>)),
    security(("Bearer" = [])),
    tag = "elab"
)]
pub async fn my_schedules(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<elab_schedule::Model>> {
    let bookings = state.services.elab.list_mine(user.user_id).await?;
    Ok(Json(ApiResponse::success(bookings)))
}

#[utoipa::path(
    post,
    path = "/api/v1/elab/schedules/{id}/pay",
    summary = "Pay for a lab booking",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = LabPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<elab_schedule::Model>),
        (status = 400, description = "Payment method and transaction id are both required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "elab"
)]
pub async fn pay_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LabPaymentRequest>,
) -> ApiResult<elab_schedule::Model> {
    let paid = state.services.elab.pay(user.user_id, id, payload).await?;
    Ok(Json(ApiResponse::success(paid)))
}

#[utoipa::path(
    get,
    path = "/api/v1/elab/all",
    summary = "All lab bookings",
    responses(
        (status = 200, description = "Every booking", body = ApiResponse<Vec<elab_schedule::Model>>),
        (status = 403, description = "Not clinical staff", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "elab"
)]
pub async fn all_schedules(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<elab_schedule::Model>> {
    let bookings = state.services.elab.all_bookings(&user).await?;
    Ok(Json(ApiResponse::success(bookings)))
}

#[utoipa::path(
    post,
    path = "/api/v1/elab/schedules/{id}/report",
    summary = "Upload lab report",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = LabReportRequest,
    responses(
        (status = 200, description = "Report attached", body = ApiResponse<elab_schedule::Model>),
        (status = 403, description = "Not clinical staff", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "elab"
)]
pub async fn upload_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LabReportRequest>,
) -> ApiResult<elab_schedule::Model> {
    let updated = state.services.elab.upload_report(&user, id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}
