use crate::{
    entities::{
        catalog::{category, pet_category, pet_product, product},
        ProductKind, ProductRef,
    },
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Live view of a catalog row, whichever catalog it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub product: ProductRef,
    pub name: String,
    pub unit_price: Decimal,
    pub requires_prescription: bool,
}

impl From<product::Model> for CatalogEntry {
    fn from(p: product::Model) -> Self {
        Self {
            product: ProductRef::General(p.id),
            name: p.name,
            unit_price: p.price,
            requires_prescription: p.requires_prescription,
        }
    }
}

impl From<pet_product::Model> for CatalogEntry {
    fn from(p: pet_product::Model) -> Self {
        Self {
            product: ProductRef::Pet(p.id),
            name: p.name,
            unit_price: p.price,
            requires_prescription: p.prescription_required,
        }
    }
}

/// Resolves one reference against its catalog.
pub async fn resolve<C: ConnectionTrait>(
    conn: &C,
    product: ProductRef,
) -> Result<Option<CatalogEntry>, ServiceError> {
    let entry = match product {
        ProductRef::General(id) => product::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(CatalogEntry::from),
        ProductRef::Pet(id) => pet_product::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(CatalogEntry::from),
    };
    Ok(entry)
}

/// Like [`resolve`] but a missing row is `NotFound`.
pub async fn require<C: ConnectionTrait>(
    conn: &C,
    product: ProductRef,
) -> Result<CatalogEntry, ServiceError> {
    resolve(conn, product)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product)))
}

/// Resolves many references with one query per catalog. Unknown references are absent from the map.
pub async fn resolve_many<C: ConnectionTrait>(
    conn: &C,
    products: impl IntoIterator<Item = ProductRef>,
) -> Result<HashMap<ProductRef, CatalogEntry>, ServiceError> {
    let mut general = BTreeSet::new();
    let mut pet = BTreeSet::new();
    for r in products {
        match r.kind() {
            ProductKind::General => general.insert(r.id()),
            ProductKind::Pet => pet.insert(r.id()),
        };
    }

    let mut entries = HashMap::with_capacity(general.len() + pet.len());
    if !general.is_empty() {
        for p in product::Entity::find()
            .filter(product::Column::Id.is_in(general))
            .all(conn)
            .await?
        {
            let entry = CatalogEntry::from(p);
            entries.insert(entry.product, entry);
        }
    }
    if !pet.is_empty() {
        for p in pet_product::Entity::find()
            .filter(pet_product::Column::Id.is_in(pet))
            .all(conn)
            .await?
        {
            let entry = CatalogEntry::from(p);
            entries.insert(entry.product, entry);
        }
    }
    Ok(entries)
}

/// Read-only browsing over both catalogs
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn products_in_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<product::Model>, ServiceError> {
        category::Entity::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))?;

        Ok(product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Case-insensitive substring search on product names. A blank query returns nothing.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<product::Model>, ServiceError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(product::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                    .like(format!("%{}%", needle)),
            )
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_pet_categories(&self) -> Result<Vec<pet_category::Model>, ServiceError> {
        Ok(pet_category::Entity::find()
            .order_by_asc(pet_category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn pet_products_in_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<pet_product::Model>, ServiceError> {
        pet_category::Entity::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Pet category {} not found", category_id))
            })?;

        Ok(pet_product::Entity::find()
            .filter(pet_product::Column::CategoryId.eq(category_id))
            .order_by_asc(pet_product::Column::Name)
            .all(&*self.db)
            .await?)
    }
}
