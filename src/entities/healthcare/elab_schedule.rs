use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::MobilePayment;

/// Home sample collection booking for a lab test
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "elab_schedules")]
#[schema(as = ELabSchedule)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_type: LabTestType,
    pub test_name: String,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub test_price: Decimal,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    #[sea_orm(nullable)]
    pub report_file: Option<String>,
    pub report_verified: bool,
    pub is_paid: bool,
    #[sea_orm(nullable)]
    pub payment_method: Option<MobilePayment>,
    #[sea_orm(nullable)]
    pub transaction_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum LabTestType {
    #[sea_orm(string_value = "Blood")]
    Blood,
    #[sea_orm(string_value = "Urine")]
    Urine,
    #[sea_orm(string_value = "Pathology")]
    Pathology,
}
