use crate::{
    auth::AuthUser,
    entities::{
        healthcare::elab_schedule::{self, LabTestType},
        MobilePayment,
    },
    errors::ServiceError,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A bookable lab test with its fixed category and price
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LabTest {
    #[schema(value_type = String)]
    pub name: &'static str,
    pub test_type: LabTestType,
    pub price: Decimal,
}

/// Offered tests. Category and price always come from here, never from the caller.
pub const LAB_TESTS: [LabTest; 7] = [
    LabTest { name: "Complete Blood Count (CBC)", test_type: LabTestType::Blood, price: dec!(500) },
    LabTest { name: "Lipid Profile", test_type: LabTestType::Blood, price: dec!(1200) },
    LabTest { name: "Blood Sugar", test_type: LabTestType::Blood, price: dec!(400) },
    LabTest { name: "Urine Analysis", test_type: LabTestType::Urine, price: dec!(300) },
    LabTest { name: "Liver Function Test", test_type: LabTestType::Pathology, price: dec!(1500) },
    LabTest { name: "Kidney Function Test", test_type: LabTestType::Pathology, price: dec!(1300) },
    LabTest { name: "Thyroid Profile", test_type: LabTestType::Pathology, price: dec!(1800) },
];

pub fn lookup_test(name: &str) -> Option<&'static LabTest> {
    let name = name.trim();
    LAB_TESTS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleLabTestRequest {
    #[validate(length(min = 1, max = 100))]
    pub test_name: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
}

/// Both fields are optional on the wire so a missing one yields a validation
/// error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LabPaymentRequest {
    pub payment_method: Option<MobilePayment>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LabReportRequest {
    #[validate(length(min = 1, max = 500))]
    pub report_file: String,
    #[serde(default)]
    pub verified: bool,
}

/// Home-collection lab test bookings
#[derive(Clone)]
pub struct ELabService {
    db: Arc<DatabaseConnection>,
}

impl ELabService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn list_tests(&self) -> &'static [LabTest] {
        &LAB_TESTS
    }

    #[instrument(skip(self, req))]
    pub async fn schedule(
        &self,
        user_id: Uuid,
        req: ScheduleLabTestRequest,
    ) -> Result<elab_schedule::Model, ServiceError> {
        req.validate()?;
        let test = lookup_test(&req.test_name).ok_or_else(|| {
            ServiceError::ValidationError(format!("Unknown lab test: {}", req.test_name.trim()))
        })?;
        let address = req.address.trim().to_string();
        let phone = req.phone.trim().to_string();
        if address.is_empty() || phone.is_empty() {
            return Err(ServiceError::ValidationError(
                "address and phone are required".to_string(),
            ));
        }
        if req.preferred_date < Utc::now().date_naive() {
            return Err(ServiceError::ValidationError(
                "preferred date cannot be in the past".to_string(),
            ));
        }

        let booking = elab_schedule::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            test_type: Set(test.test_type),
            test_name: Set(test.name.to_string()),
            test_price: Set(test.price),
            preferred_date: Set(req.preferred_date),
            preferred_time: Set(req.preferred_time),
            address: Set(address),
            phone: Set(phone),
            created_at: Set(Utc::now()),
            report_file: Set(None),
            report_verified: Set(false),
            is_paid: Set(false),
            payment_method: Set(None),
            transaction_id: Set(None),
        }
        .insert(&*self.db)
        .await?;

        counter!("medimart.elab.scheduled", 1);
        info!(booking_id = %booking.id, test = %booking.test_name, "lab test scheduled");
        Ok(booking)
    }

    /// The caller's bookings, newest first.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<elab_schedule::Model>, ServiceError> {
        Ok(elab_schedule::Entity::find()
            .filter(elab_schedule::Column::UserId.eq(user_id))
            .order_by_desc(elab_schedule::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, req))]
    pub async fn pay(
        &self,
        user_id: Uuid,
        booking_id: Uuid,
        req: LabPaymentRequest,
    ) -> Result<elab_schedule::Model, ServiceError> {
        let transaction_id = req
            .transaction_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let (Some(payment_method), Some(transaction_id)) = (req.payment_method, transaction_id)
        else {
            return Err(ServiceError::ValidationError(
                "payment method and transaction id are both required".to_string(),
            ));
        };

        let booking = elab_schedule::Entity::find_by_id(booking_id)
            .filter(elab_schedule::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Lab booking {} not found", booking_id)))?;
        let already_paid =
            || ServiceError::InvalidOperation(format!("Lab booking {} is already paid", booking_id));
        if booking.is_paid {
            return Err(already_paid());
        }

        let result = elab_schedule::Entity::update_many()
            .set(elab_schedule::ActiveModel {
                payment_method: Set(Some(payment_method)),
                transaction_id: Set(Some(transaction_id)),
                is_paid: Set(true),
                ..Default::default()
            })
            .filter(elab_schedule::Column::Id.eq(booking_id))
            .filter(elab_schedule::Column::IsPaid.eq(false))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(already_paid());
        }
        let paid = elab_schedule::Entity::find_by_id(booking_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Lab booking {} not found", booking_id)))?;

        info!(booking_id = %paid.id, amount = %paid.test_price, "lab booking paid");
        Ok(paid)
    }

    /// Every booking, soonest preferred date first. Clinical staff only.
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn all_bookings(
        &self,
        user: &AuthUser,
    ) -> Result<Vec<elab_schedule::Model>, ServiceError> {
        require_lab_staff(user)?;
        Ok(elab_schedule::Entity::find()
            .order_by_asc(elab_schedule::Column::PreferredDate)
            .order_by_asc(elab_schedule::Column::PreferredTime)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, user, req), fields(user_id = %user.user_id))]
    pub async fn upload_report(
        &self,
        user: &AuthUser,
        booking_id: Uuid,
        req: LabReportRequest,
    ) -> Result<elab_schedule::Model, ServiceError> {
        require_lab_staff(user)?;
        req.validate()?;

        let booking = elab_schedule::Entity::find_by_id(booking_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Lab booking {} not found", booking_id)))?;

        let mut active: elab_schedule::ActiveModel = booking.into();
        active.report_file = Set(Some(req.report_file.trim().to_string()));
        active.report_verified = Set(req.verified);
        let updated = active.update(&*self.db).await?;

        info!(booking_id = %updated.id, verified = updated.report_verified, "lab report uploaded");
        Ok(updated)
    }
}

fn require_lab_staff(user: &AuthUser) -> Result<(), ServiceError> {
    if user.role.is_clinical_staff() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "only clinical staff may manage lab bookings".to_string(),
        ))
    }
}
