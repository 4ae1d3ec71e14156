//! SeaORM entities for the pharmacy, pet shop and healthcare booking tables.

pub mod catalog;
pub mod commerce;
pub mod healthcare;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Which catalog a product row lives in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "pet")]
    Pet,
}

/// Reference to exactly one catalog entry in either catalog.
///
/// Rows store it as a `(product_kind, product_id)` column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ProductRef {
    General(Uuid),
    Pet(Uuid),
}

impl ProductRef {
    pub fn new(kind: ProductKind, id: Uuid) -> Self {
        match kind {
            ProductKind::General => ProductRef::General(id),
            ProductKind::Pet => ProductRef::Pet(id),
        }
    }

    pub fn kind(&self) -> ProductKind {
        match self {
            ProductRef::General(_) => ProductKind::General,
            ProductRef::Pet(_) => ProductKind::Pet,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ProductRef::General(id) | ProductRef::Pet(id) => *id,
        }
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind() {
            ProductKind::General => "general",
            ProductKind::Pet => "pet",
        };
        write!(f, "{}:{}", kind, self.id())
    }
}

/// Payment channels for appointments and lab bookings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MobilePayment {
    #[sea_orm(string_value = "bkash")]
    Bkash,
    #[sea_orm(string_value = "nagad")]
    Nagad,
}
