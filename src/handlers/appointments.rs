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
    auth::{AuthUser, MaybeAuthUser},
    entities::healthcare::appointment,
    errors::ServiceError,
    handlers::common::created,
    services::healthcare::appointment_service::{
        AppointmentPaymentRequest, BookAppointmentRequest, DoctorAppointmentView, DoctorDashboard,
        GuestVetBookingRequest, PetAppointmentRequest,
    },
    ApiResponse, ApiResult, AppState,
};

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

pub fn appointments_routes() -> Router<AppState> {
    Router::new()
        .route("/doctors/{id}/appointments", post(book_doctor))
        .route("/vets/{id}/appointments", post(book_vet))
        .route("/vets/{id}/pet-appointments", post(book_pet_visit))
        .route("/appointments", get(my_appointments))
        .route("/appointments/{id}/pay", post(pay_appointment))
        .route("/doctor/appointments", get(doctor_appointments))
        .route("/doctor/dashboard", get(doctor_dashboard))
        .route(
            "/doctor/appointments/{id}/prescription",
            post(attach_prescription),
        )
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AttachPrescriptionRequest {
    #[validate(length(min = 1, max = 500))]
    pub file_ref: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/doctors/{id}/appointments",
    summary = "Book a doctor",
    params(("id" = Uuid, Path, description = "Doctor ID")),
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<appointment::Model>),
        (status = 400, description = "Date in the past", body = crate::errors::ErrorResponse),
        (status = 404, description = "Doctor not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slot already taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "appointments"
)]
pub async fn book_doctor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(doctor_id): Path<Uuid>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Created<appointment::Model> {
    let booked = state
        .services
        .appointments
        .book_for_patient(&user, doctor_id, payload)
        .await?;
    Ok(created(booked))
}

/// Vet booking; anonymous callers supply a name and phone
#[utoipa::path(
    post,
    path = "/api/v1/vets/{id}/appointments",
    summary = "Book a vet",
    params(("id" = Uuid, Path, description = "Vet ID")),
    request_body = GuestVetBookingRequest,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<appointment::Model>),
        (status = 400, description = "Missing guest details or not a vet", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slot already taken", body = crate::errors::ErrorResponse),
    ),
    tag = "appointments"
)]
pub async fn book_vet(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(vet_id): Path<Uuid>,
    Json(payload): Json<GuestVetBookingRequest>,
) -> Created<appointment::Model> {
    let booked = state
        .services
        .appointments
        .book_guest_vet(user.as_ref(), vet_id, payload)
        .await?;
    Ok(created(booked))
}

#[utoipa::path(
    post,
    path = "/api/v1/vets/{id}/pet-appointments",
    summary = "Book an online pet consultation",
    params(("id" = Uuid, Path, description = "Vet ID")),
    request_body = PetAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<appointment::Model>),
        (status = 409, description = "Slot already taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "appointments"
)]
pub async fn book_pet_visit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(vet_id): Path<Uuid>,
    Json(payload): Json<PetAppointmentRequest>,
) -> Created<appointment::Model> {
    let booked = state
        .services
        .appointments
        .book_pet_visit(&user, vet_id, payload)
        .await?;
    Ok(created(booked))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    summary = "My appointments",
    responses(
        (status = 200, description = "Appointments, latest slot first", body = ApiResponse<Vec<appointment::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "appointments"
)]
pub async fn my_appointments(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<appointment::Model>> {
    let appointments = state
        .services
        .appointments
        .patient_appointments(user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(appointments)))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/pay",
    summary = "Pay for an appointment",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = AppointmentPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<appointment::Model>),
        (status = 400, description = "Missing transaction id or already paid", body = crate::errors::ErrorResponse),
        (status = 404, description = "Appointment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "appointments"
)]
pub async fn pay_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AppointmentPaymentRequest>,
) -> ApiResult<appointment::Model> {
    let paid = state.services.appointments.pay(&user, id, payload).await?;
    Ok(Json(ApiResponse::success(paid)))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctor/appointments",
    summary = "Doctor's appointment list",
    responses(
        (status = 200, description = "Appointments with the patients' approved prescriptions", body = ApiResponse<Vec<DoctorAppointmentView>>),
        (status = 403, description = "No doctor profile", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "doctor"
)]
pub async fn doctor_appointments(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Vec<DoctorAppointmentView>> {
    let views = state.services.appointments.doctor_appointments(&user).await?;
    Ok(Json(ApiResponse::success(views)))
}

#[utoipa::path(
    get,
    path = "/api/v1/doctor/dashboard",
    summary = "Doctor dashboard",
    responses(
        (status = 200, description = "Appointment counts and earnings", body = ApiResponse<DoctorDashboard>),
        (status = 403, description = "No doctor profile", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "doctor"
)]
pub async fn doctor_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<DoctorDashboard> {
    let dashboard = state.services.appointments.doctor_dashboard(&user).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

#[utoipa::path(
    post,
    path = "/api/v1/doctor/appointments/{id}/prescription",
    summary = "Attach prescription file",
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = AttachPrescriptionRequest,
    responses(
        (status = 200, description = "File attached", body = ApiResponse<appointment::Model>),
        (status = 403, description = "Not this appointment's doctor", body = crate::errors::ErrorResponse),
        (status = 404, description = "Appointment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "doctor"
)]
pub async fn attach_prescription(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachPrescriptionRequest>,
) -> ApiResult<appointment::Model> {
    payload.validate()?;
    let updated = state
        .services
        .appointments
        .attach_prescription_file(&user, id, payload.file_ref)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
