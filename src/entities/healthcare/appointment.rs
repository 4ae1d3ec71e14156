use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::MobilePayment;

/// Booked visit; `(doctor_id, date, time)` is unique
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "appointments")]
#[schema(as = Appointment)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub doctor_id: Uuid,
    /// Absent for guest bookings
    #[sea_orm(nullable)]
    pub patient_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub patient_name: Option<String>,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    pub visit_type: VisitType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    #[sea_orm(nullable)]
    pub meeting_link: Option<String>,
    #[sea_orm(nullable)]
    pub prescription_file: Option<String>,
    pub is_paid: bool,
    #[sea_orm(nullable)]
    pub payment_method: Option<MobilePayment>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    #[sea_orm(nullable)]
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::doctor::Entity",
        from = "Column::DoctorId",
        to = "super::doctor::Column::Id",
        on_delete = "Cascade"
    )]
    Doctor,
}

impl Related<super::doctor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Doctor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "kebab-case")]
pub enum VisitType {
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "in-person")]
    InPerson,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum AppointmentStatus {
    #[sea_orm(string_value = "Booked")]
    Booked,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}
