use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Doctor or veterinarian profile, optionally linked to a login identity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "doctors")]
#[schema(as = Doctor)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique, nullable)]
    pub user_id: Option<Uuid>,
    pub name: String,
    pub specialty: String,
    pub doctor_type: DoctorType,
    /// Comma separated, e.g. "Bangla,English"
    pub languages: String,
    pub location: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub fee: Decimal,
    #[sea_orm(nullable)]
    pub bkash_number: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    #[sea_orm(nullable)]
    pub image_ref: Option<String>,
}

impl Model {
    pub fn is_vet(&self) -> bool {
        self.doctor_type == DoctorType::Vet
    }

    pub fn language_list(&self) -> Vec<&str> {
        self.languages
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::schedule::Entity")]
    Schedules,
    #[sea_orm(has_many = "super::appointment::Entity")]
    Appointments,
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedules.def()
    }
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum DoctorType {
    #[sea_orm(string_value = "human")]
    Human,
    #[sea_orm(string_value = "vet")]
    Vet,
}
