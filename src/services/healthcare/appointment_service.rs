use crate::{
    auth::AuthUser,
    entities::{
        healthcare::{
            appointment::{self, AppointmentStatus, VisitType},
            doctor, prescription,
            prescription::PrescriptionStatus,
        },
        MobilePayment,
    },
    errors::ServiceError,
    services::healthcare::prescription_service::doctor_for_user,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookAppointmentRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub visit_type: VisitType,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
}

/// Online vet consultation booked on behalf of a pet
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PetAppointmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub pet_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Vet booking that does not require an account
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GuestVetBookingRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub visit_type: VisitType,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AppointmentPaymentRequest {
    pub payment_method: MobilePayment,
    #[validate(length(min = 1, max = 100))]
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorAppointmentView {
    pub appointment: appointment::Model,
    /// The patient's newest approved prescription, if any
    pub approved_prescription: Option<prescription::Model>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorDashboard {
    pub doctor: doctor::Model,
    pub total_appointments: u64,
    pub paid_appointments: u64,
    pub total_earnings: Decimal,
}

/// Appointment before storage-derived defaults are applied
#[derive(Debug, Clone)]
struct NewAppointment {
    doctor: doctor::Model,
    patient_id: Option<Uuid>,
    patient_name: Option<String>,
    phone: Option<String>,
    visit_type: VisitType,
    date: NaiveDate,
    time: NaiveTime,
    notes: Option<String>,
    meeting_link: Option<String>,
    amount: Decimal,
}

impl NewAppointment {
    /// Online visits get a generated link; a zero amount becomes the doctor's fee.
    fn finalize(mut self, link_base: &str) -> Self {
        if self.visit_type == VisitType::Online && self.meeting_link.is_none() {
            self.meeting_link = Some(meeting_link(link_base));
        }
        if self.amount.is_zero() {
            self.amount = self.doctor.fee;
        }
        self
    }
}

/// `<base><8 hex chars>`
pub fn meeting_link(base: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}{}", base, &token[..8])
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Slot-unique booking for doctors and vets
#[derive(Clone)]
pub struct AppointmentService {
    db: Arc<DatabaseConnection>,
    meeting_link_base: String,
}

impl AppointmentService {
    pub fn new(db: Arc<DatabaseConnection>, meeting_link_base: String) -> Self {
        Self {
            db,
            meeting_link_base,
        }
    }

    async fn find_doctor(&self, doctor_id: Uuid) -> Result<doctor::Model, ServiceError> {
        doctor::Entity::find_by_id(doctor_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Doctor {} not found", doctor_id)))
    }

    async fn find_vet(&self, vet_id: Uuid) -> Result<doctor::Model, ServiceError> {
        let vet = self.find_doctor(vet_id).await?;
        if !vet.is_vet() {
            return Err(ServiceError::InvalidOperation(format!(
                "Doctor {} is not a veterinarian",
                vet_id
            )));
        }
        Ok(vet)
    }

    /// Stores the appointment. The unique `(doctor_id, date, time)` index is
    /// the guard; the pre-check only gives the common case a clean error.
    async fn insert(&self, new: NewAppointment) -> Result<appointment::Model, ServiceError> {
        if new.date < Utc::now().date_naive() {
            return Err(ServiceError::ValidationError(
                "appointment date cannot be in the past".to_string(),
            ));
        }

        let new = new.finalize(&self.meeting_link_base);
        let slot = format!("{} on {} at {}", new.doctor.name, new.date, new.time);

        let taken = appointment::Entity::find()
            .filter(appointment::Column::DoctorId.eq(new.doctor.id))
            .filter(appointment::Column::Date.eq(new.date))
            .filter(appointment::Column::Time.eq(new.time))
            .count(&*self.db)
            .await?;
        if taken > 0 {
            return Err(ServiceError::SlotTaken(slot));
        }

        let stored = appointment::ActiveModel {
            id: Set(Uuid::new_v4()),
            doctor_id: Set(new.doctor.id),
            patient_id: Set(new.patient_id),
            patient_name: Set(new.patient_name),
            phone: Set(new.phone),
            visit_type: Set(new.visit_type),
            date: Set(new.date),
            time: Set(new.time),
            notes: Set(new.notes),
            status: Set(AppointmentStatus::Booked),
            meeting_link: Set(new.meeting_link),
            prescription_file: Set(None),
            is_paid: Set(false),
            payment_method: Set(None),
            amount: Set(new.amount),
            transaction_id: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            ServiceError::from_unique_violation(e, || ServiceError::SlotTaken(slot.clone()))
        })?;

        counter!("medimart.appointments.booked", 1);
        info!(
            appointment_id = %stored.id,
            doctor_id = %stored.doctor_id,
            date = %stored.date,
            time = %stored.time,
            "appointment booked"
        );
        Ok(stored)
    }

    /// Registered patient booking with any doctor or vet.
    #[instrument(skip(self, user, req), fields(user_id = %user.user_id))]
    pub async fn book_for_patient(
        &self,
        user: &AuthUser,
        doctor_id: Uuid,
        req: BookAppointmentRequest,
    ) -> Result<appointment::Model, ServiceError> {
        req.validate()?;
        let doctor = self.find_doctor(doctor_id).await?;

        self.insert(NewAppointment {
            doctor,
            patient_id: Some(user.user_id),
            patient_name: Some(user.name.clone()),
            phone: non_blank(req.phone),
            visit_type: req.visit_type,
            date: req.date,
            time: req.time,
            notes: non_blank(req.notes),
            meeting_link: None,
            amount: Decimal::ZERO,
        })
        .await
    }

    /// Online vet consultation for a pet; the pet's name leads the notes.
    #[instrument(skip(self, user, req), fields(user_id = %user.user_id))]
    pub async fn book_pet_visit(
        &self,
        user: &AuthUser,
        vet_id: Uuid,
        req: PetAppointmentRequest,
    ) -> Result<appointment::Model, ServiceError> {
        req.validate()?;
        let vet = self.find_vet(vet_id).await?;

        let mut notes = format!("Pet: {}", req.pet_name.trim());
        if let Some(extra) = non_blank(req.notes) {
            notes.push('\n');
            notes.push_str(&extra);
        }

        self.insert(NewAppointment {
            doctor: vet,
            patient_id: Some(user.user_id),
            patient_name: Some(user.name.clone()),
            phone: None,
            visit_type: VisitType::Online,
            date: req.date,
            time: req.time,
            notes: Some(notes),
            meeting_link: None,
            amount: Decimal::ZERO,
        })
        .await
    }

    /// Vet booking open to anonymous callers, who must leave a name and phone.
    #[instrument(skip(self, user, req))]
    pub async fn book_guest_vet(
        &self,
        user: Option<&AuthUser>,
        vet_id: Uuid,
        req: GuestVetBookingRequest,
    ) -> Result<appointment::Model, ServiceError> {
        req.validate()?;
        let name = non_blank(req.name);
        let phone = non_blank(req.phone);

        let (patient_id, patient_name) = match user {
            Some(user) => (Some(user.user_id), name.or_else(|| Some(user.name.clone()))),
            None => {
                if name.is_none() || phone.is_none() {
                    return Err(ServiceError::ValidationError(
                        "name and phone are required for guest bookings".to_string(),
                    ));
                }
                (None, name)
            }
        };

        let vet = self.find_vet(vet_id).await?;
        self.insert(NewAppointment {
            doctor: vet,
            patient_id,
            patient_name,
            phone,
            visit_type: req.visit_type,
            date: req.date,
            time: req.time,
            notes: non_blank(req.notes),
            meeting_link: None,
            amount: Decimal::ZERO,
        })
        .await
    }

    /// Records a mobile payment for the caller's own appointment.
    #[instrument(skip(self, user, req), fields(user_id = %user.user_id))]
    pub async fn pay(
        &self,
        user: &AuthUser,
        appointment_id: Uuid,
        req: AppointmentPaymentRequest,
    ) -> Result<appointment::Model, ServiceError> {
        req.validate()?;
        let transaction_id = req.transaction_id.trim().to_string();
        if transaction_id.is_empty() {
            return Err(ServiceError::ValidationError(
                "transaction id is required".to_string(),
            ));
        }

        let appointment = appointment::Entity::find_by_id(appointment_id)
            .filter(appointment::Column::PatientId.eq(user.user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Appointment {} not found", appointment_id))
            })?;
        let already_paid = || {
            ServiceError::InvalidOperation(format!(
                "Appointment {} is already paid",
                appointment_id
            ))
        };
        if appointment.is_paid {
            return Err(already_paid());
        }
        let doctor = self.find_doctor(appointment.doctor_id).await?;

        // Only one of two racing payments can flip is_paid.
        let result = appointment::Entity::update_many()
            .set(appointment::ActiveModel {
                payment_method: Set(Some(req.payment_method)),
                transaction_id: Set(Some(transaction_id)),
                amount: Set(doctor.fee),
                is_paid: Set(true),
                ..Default::default()
            })
            .filter(appointment::Column::Id.eq(appointment_id))
            .filter(appointment::Column::IsPaid.eq(false))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(already_paid());
        }
        let paid = appointment::Entity::find_by_id(appointment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Appointment {} not found", appointment_id))
            })?;

        info!(appointment_id = %paid.id, amount = %paid.amount, "appointment paid");
        Ok(paid)
    }

    /// The caller's appointments, most recent slot first.
    #[instrument(skip(self))]
    pub async fn patient_appointments(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<appointment::Model>, ServiceError> {
        Ok(appointment::Entity::find()
            .filter(appointment::Column::PatientId.eq(user_id))
            .order_by_desc(appointment::Column::Date)
            .order_by_desc(appointment::Column::Time)
            .all(&*self.db)
            .await?)
    }

    async fn require_doctor(&self, user: &AuthUser) -> Result<doctor::Model, ServiceError> {
        doctor_for_user(&*self.db, user.user_id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("no doctor profile linked to this account".into()))
    }

    /// Appointments of the calling doctor in slot order, each with the
    /// patient's newest approved prescription.
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn doctor_appointments(
        &self,
        user: &AuthUser,
    ) -> Result<Vec<DoctorAppointmentView>, ServiceError> {
        let doctor = self.require_doctor(user).await?;

        let appointments = appointment::Entity::find()
            .filter(appointment::Column::DoctorId.eq(doctor.id))
            .order_by_asc(appointment::Column::Date)
            .order_by_asc(appointment::Column::Time)
            .all(&*self.db)
            .await?;

        let patients: BTreeSet<Uuid> = appointments.iter().filter_map(|a| a.patient_id).collect();
        let mut latest: HashMap<Uuid, prescription::Model> = HashMap::new();
        if !patients.is_empty() {
            // Newest first, so the first one seen per patient wins.
            for rx in prescription::Entity::find()
                .filter(prescription::Column::UserId.is_in(patients))
                .filter(prescription::Column::Status.eq(PrescriptionStatus::Approved))
                .order_by_desc(prescription::Column::UploadedAt)
                .all(&*self.db)
                .await?
            {
                latest.entry(rx.user_id).or_insert(rx);
            }
        }

        Ok(appointments
            .into_iter()
            .map(|appointment| DoctorAppointmentView {
                approved_prescription: appointment
                    .patient_id
                    .and_then(|p| latest.get(&p).cloned()),
                appointment,
            })
            .collect())
    }

    /// Paid visit count and earnings (the doctor's fee per paid visit).
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn doctor_dashboard(&self, user: &AuthUser) -> Result<DoctorDashboard, ServiceError> {
        let doctor = self.require_doctor(user).await?;

        let total_appointments = appointment::Entity::find()
            .filter(appointment::Column::DoctorId.eq(doctor.id))
            .count(&*self.db)
            .await?;
        let paid_appointments = appointment::Entity::find()
            .filter(appointment::Column::DoctorId.eq(doctor.id))
            .filter(appointment::Column::IsPaid.eq(true))
            .count(&*self.db)
            .await?;

        Ok(DoctorDashboard {
            total_earnings: doctor.fee * Decimal::from(paid_appointments),
            doctor,
            total_appointments,
            paid_appointments,
        })
    }

    /// Attaches a prescription document; only the appointment's own doctor may.
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn attach_prescription_file(
        &self,
        user: &AuthUser,
        appointment_id: Uuid,
        file_ref: String,
    ) -> Result<appointment::Model, ServiceError> {
        let file_ref = file_ref.trim().to_string();
        if file_ref.is_empty() {
            return Err(ServiceError::ValidationError(
                "prescription file is required".to_string(),
            ));
        }

        let doctor = self.require_doctor(user).await?;
        let appointment = appointment::Entity::find_by_id(appointment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Appointment {} not found", appointment_id))
            })?;
        if appointment.doctor_id != doctor.id {
            return Err(ServiceError::Forbidden(
                "appointment belongs to another doctor".to_string(),
            ));
        }

        let mut active: appointment::ActiveModel = appointment.into();
        active.prescription_file = Set(Some(file_ref));
        let updated = active.update(&*self.db).await?;

        info!(appointment_id = %updated.id, "prescription file attached");
        Ok(updated)
    }
}
