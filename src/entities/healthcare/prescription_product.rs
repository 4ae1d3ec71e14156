use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entities::{ProductKind, ProductRef};

/// Restricted product covered by a prescription
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prescription_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub prescription_id: Uuid,
    pub product_kind: ProductKind,
    pub product_id: Uuid,
}

impl Model {
    pub fn product_ref(&self) -> ProductRef {
        ProductRef::new(self.product_kind, self.product_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::prescription::Entity",
        from = "Column::PrescriptionId",
        to = "super::prescription::Column::Id",
        on_delete = "Cascade"
    )]
    Prescription,
}

impl Related<super::prescription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prescription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
