use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "pet_categories")]
#[schema(as = PetCategory)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(nullable)]
    pub short_description: Option<String>,
    #[sea_orm(nullable)]
    pub image_ref: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pet_product::Entity")]
    PetProducts,
}

impl Related<super::pet_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
