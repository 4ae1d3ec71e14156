use crate::{
    entities::{
        commerce::{cart, cart_item},
        ProductRef,
    },
    errors::ServiceError,
    services::{
        catalog,
        healthcare::prescription_service::covered_products,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// A cart line joined with its live catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartLine {
    pub item_id: Uuid,
    pub product: ProductRef,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
    pub requires_prescription: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: usize,
    /// Whether any line needs a prescription
    pub prescription_required: bool,
    /// Whether every restricted line is covered by an approved prescription.
    /// Always true when nothing in the cart is restricted.
    pub has_approved_prescription: bool,
    /// Restricted products not covered by an approved prescription
    pub uncovered_products: Vec<ProductRef>,
}

/// Anonymous cart captured client-side, merged into the persistent cart after login
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CartSnapshot {
    pub items: Vec<SnapshotLine>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SnapshotLine {
    pub product: ProductRef,
    pub quantity: i32,
}

impl CartSnapshot {
    /// Sums duplicate lines. Any quantity outside the line limits rejects the whole snapshot.
    pub fn normalized(&self) -> Result<BTreeMap<ProductRef, i32>, ServiceError> {
        let mut merged = BTreeMap::new();
        for line in &self.items {
            validate_quantity(line.quantity)?;
            let entry = merged.entry(line.product).or_insert(0i32);
            *entry += line.quantity;
            validate_quantity(*entry)?;
        }
        Ok(merged)
    }
}

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 999;

pub(crate) fn validate_quantity(quantity: i32) -> Result<(), ServiceError> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(ServiceError::ValidationError(format!(
            "quantity must be between 1 and {}, got {}",
            MAX_LINE_QUANTITY, quantity
        )));
    }
    Ok(())
}

pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(|l| l.subtotal).sum()
}

/// Distinct products among `lines` that need a prescription.
pub fn restricted_products(lines: &[CartLine]) -> BTreeSet<ProductRef> {
    lines
        .iter()
        .filter(|l| l.requires_prescription)
        .map(|l| l.product)
        .collect()
}

pub(crate) async fn find_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<cart::Model>, ServiceError> {
    Ok(cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// Finds the user's cart and holds a row lock on it until `conn`'s transaction ends.
///
/// Cart mutations and checkout all take this lock first, so they serialize per cart.
pub(crate) async fn lock_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<cart::Model>, ServiceError> {
    Ok(cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(conn)
        .await?)
}

async fn touch<C: ConnectionTrait>(conn: &C, cart: cart::Model) -> Result<(), ServiceError> {
    let mut active: cart::ActiveModel = cart.into();
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;
    Ok(())
}

/// Loads a cart's lines priced from the live catalog.
///
/// Lines whose product row no longer exists are skipped.
pub(crate) async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
) -> Result<Vec<CartLine>, ServiceError> {
    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::AddedAt)
        .all(conn)
        .await?;

    let entries = catalog::resolve_many(conn, items.iter().map(|i| i.product_ref())).await?;

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = item.product_ref();
        let Some(entry) = entries.get(&product) else {
            warn!(cart_id = %cart_id, product = %product, "cart line references a missing product");
            continue;
        };
        lines.push(CartLine {
            item_id: item.id,
            product,
            name: entry.name.clone(),
            unit_price: entry.unit_price,
            quantity: item.quantity,
            subtotal: entry.unit_price * Decimal::from(item.quantity),
            requires_prescription: entry.requires_prescription,
        });
    }
    Ok(lines)
}

/// Inserts a line or adds to the quantity of the existing one, atomically.
///
/// The increment only applies while the line stays within [`MAX_LINE_QUANTITY`].
async fn upsert_line<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
    product: ProductRef,
    quantity: i32,
) -> Result<(), ServiceError> {
    let line = cart_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart_id),
        product_kind: Set(product.kind()),
        product_id: Set(product.id()),
        quantity: Set(quantity),
        added_at: Set(Utc::now()),
    };

    let affected = cart_item::Entity::insert(line)
        .on_conflict(
            OnConflict::columns([
                cart_item::Column::CartId,
                cart_item::Column::ProductKind,
                cart_item::Column::ProductId,
            ])
            .value(
                cart_item::Column::Quantity,
                Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(quantity),
            )
            .action_and_where(
                Expr::col((cart_item::Entity, cart_item::Column::Quantity))
                    .lte(MAX_LINE_QUANTITY - quantity),
            )
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    if affected == 0 {
        return Err(ServiceError::ValidationError(format!(
            "{} would exceed {} units in the cart",
            product, MAX_LINE_QUANTITY
        )));
    }
    Ok(())
}

/// Per-user shopping cart
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Returns the user's cart, creating it on first use.
    ///
    /// Two concurrent first adds race on the unique `user_id`; the loser's
    /// insert is a no-op and both read the same row.
    async fn ensure_cart(&self, user_id: Uuid) -> Result<cart::Model, ServiceError> {
        if let Some(existing) = find_cart(&*self.db, user_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let new_cart = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        cart::Entity::insert(new_cart)
            .on_conflict(
                OnConflict::column(cart::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        find_cart(&*self.db, user_id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("cart for user {} vanished after insert", user_id))
        })
    }

    #[instrument(skip(self))]
    pub async fn view(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let lines = match find_cart(&*self.db, user_id).await? {
            Some(cart) => load_lines(&*self.db, cart.id).await?,
            None => Vec::new(),
        };

        let restricted = restricted_products(&lines);
        let uncovered = if restricted.is_empty() {
            Vec::new()
        } else {
            let covered = covered_products(&*self.db, user_id).await?;
            restricted.difference(&covered).copied().collect()
        };

        Ok(CartView {
            total: cart_total(&lines),
            item_count: lines.len(),
            prescription_required: !restricted.is_empty(),
            has_approved_prescription: uncovered.is_empty(),
            uncovered_products: uncovered,
            items: lines,
        })
    }

    /// Adds `quantity` of a product, creating the cart and line as needed.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product: ProductRef,
        quantity: i32,
    ) -> Result<CartView, ServiceError> {
        validate_quantity(quantity)?;
        let entry = catalog::require(&*self.db, product).await?;

        self.ensure_cart(user_id).await?;

        let txn = self.db.begin().await?;
        let cart = lock_cart(&txn, user_id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("cart for user {} disappeared", user_id))
        })?;
        upsert_line(&txn, cart.id, product, quantity).await?;
        touch(&txn, cart).await?;
        txn.commit().await?;

        info!(user_id = %user_id, product = %product, quantity, "added {} to cart", entry.name);
        self.view(user_id).await
    }

    /// Sets the quantity of an existing line. Removal goes through [`Self::remove_item`].
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        product: ProductRef,
        quantity: i32,
    ) -> Result<CartView, ServiceError> {
        validate_quantity(quantity)?;

        let not_in_cart = || ServiceError::NotFound(format!("Product {} is not in the cart", product));
        let txn = self.db.begin().await?;
        let cart = lock_cart(&txn, user_id).await?.ok_or_else(not_in_cart)?;
        let item = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductKind.eq(product.kind()))
            .filter(cart_item::Column::ProductId.eq(product.id()))
            .one(&txn)
            .await?
            .ok_or_else(not_in_cart)?;

        let mut item: cart_item::ActiveModel = item.into();
        item.quantity = Set(quantity);
        item.update(&txn).await?;
        touch(&txn, cart).await?;
        txn.commit().await?;

        info!(user_id = %user_id, product = %product, quantity, "updated cart quantity");
        self.view(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        product: ProductRef,
    ) -> Result<CartView, ServiceError> {
        let not_in_cart = || ServiceError::NotFound(format!("Product {} is not in the cart", product));
        let txn = self.db.begin().await?;
        let cart = lock_cart(&txn, user_id).await?.ok_or_else(not_in_cart)?;

        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductKind.eq(product.kind()))
            .filter(cart_item::Column::ProductId.eq(product.id()))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(not_in_cart());
        }
        touch(&txn, cart).await?;
        txn.commit().await?;

        info!(user_id = %user_id, product = %product, "removed product from cart");
        self.view(user_id).await
    }

    /// Merges an anonymous cart into the user's cart in one transaction.
    ///
    /// Quantities add to existing lines. An unknown product rejects the whole snapshot.
    #[instrument(skip(self, snapshot), fields(lines = snapshot.items.len()))]
    pub async fn merge_snapshot(
        &self,
        user_id: Uuid,
        snapshot: CartSnapshot,
    ) -> Result<CartView, ServiceError> {
        let lines = snapshot.normalized()?;
        if lines.is_empty() {
            return self.view(user_id).await;
        }

        self.ensure_cart(user_id).await?;

        let txn = self.db.begin().await?;
        let cart = lock_cart(&txn, user_id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("cart for user {} disappeared", user_id))
        })?;
        let known = catalog::resolve_many(&txn, lines.keys().copied()).await?;
        if let Some(unknown) = lines.keys().find(|p| !known.contains_key(p)) {
            return Err(ServiceError::NotFound(format!("Product {} not found", unknown)));
        }
        for (product, quantity) in &lines {
            upsert_line(&txn, cart.id, *product, *quantity).await?;
        }
        touch(&txn, cart).await?;
        txn.commit().await?;

        info!(user_id = %user_id, merged = lines.len(), "merged cart snapshot");
        self.view(user_id).await
    }

    /// Number of distinct lines in the user's cart; zero when no cart exists.
    #[instrument(skip(self))]
    pub async fn item_count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let Some(cart) = find_cart(&*self.db, user_id).await? else {
            return Ok(0);
        };
        Ok(cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .count(&*self.db)
            .await?)
    }
}
