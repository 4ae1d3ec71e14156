use axum::{extract::State, routing::get, Json, Router};

use crate::{
    auth::AuthUser, services::dashboard::PatientDashboard, ApiResponse, ApiResult, AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(patient_dashboard))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    summary = "Patient dashboard",
    description = "Prescriptions, orders, appointments, lab bookings and the cart size in one call",
    responses(
        (status = 200, description = "Dashboard", body = ApiResponse<PatientDashboard>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn patient_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<PatientDashboard> {
    let dashboard = state
        .services
        .dashboard
        .patient_dashboard(user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(dashboard)))
}
