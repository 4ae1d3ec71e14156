use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pet shop product, priced independently of the pharmacy catalog
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "pet_products")]
#[schema(as = PetProduct)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub prescription_required: bool,
    #[sea_orm(nullable)]
    pub image_ref: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pet_category::Entity",
        from = "Column::CategoryId",
        to = "super::pet_category::Column::Id"
    )]
    PetCategory,
}

impl Related<super::pet_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
