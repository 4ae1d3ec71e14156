use crate::{
    entities::commerce::{
        cart_item,
        order::{self, OrderStatus, PaymentMethod},
        order_item,
    },
    errors::ServiceError,
    services::{
        commerce::cart_service::{cart_total, load_lines, lock_cart, restricted_products},
        healthcare::prescription_service::{covered_products, missing_coverage},
    },
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
}

/// Order as placed, with its snapshotted lines
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderReceipt {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Converts a cart into an order, gated on prescription coverage
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
}

impl CheckoutService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Places an order from the user's cart.
    ///
    /// Reads, gating and writes share one transaction: either the order,
    /// its items and the emptied cart are all committed, or nothing is.
    /// The cart row stays locked throughout, so concurrent cart edits and a
    /// second checkout wait and then see the result.
    #[instrument(skip(self))]
    pub async fn checkout(
        &self,
        user_id: Uuid,
        payment_method: PaymentMethod,
    ) -> Result<OrderReceipt, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = lock_cart(&txn, user_id).await?.ok_or(ServiceError::EmptyCart)?;
        let lines = load_lines(&txn, cart.id).await?;
        if lines.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let restricted = restricted_products(&lines);
        if !restricted.is_empty() {
            let covered = covered_products(&txn, user_id).await?;
            let missing = missing_coverage(&restricted, &covered);
            if !missing.is_empty() {
                warn!(
                    user_id = %user_id,
                    missing = missing.len(),
                    "checkout blocked: prescription coverage incomplete"
                );
                counter!("medimart.checkout.blocked", 1);
                return Err(ServiceError::PrescriptionRequired(missing));
            }
        }

        let now = Utc::now();
        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            total_price: Set(cart_total(&lines)),
            payment_method: Set(payment_method),
            status: Set(OrderStatus::Pending),
            is_paid: Set(payment_method.is_prepaid()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_kind: Set(line.product.kind()),
                product_id: Set(Some(line.product.id())),
                name: Set(line.name.clone()),
                price: Set(line.unit_price),
                quantity: Set(line.quantity),
            }
            .insert(&txn)
            .await?;
            items.push(item);
        }

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::Id.is_in(lines.iter().map(|l| l.item_id)))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        counter!("medimart.checkout.completed", 1);
        info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.total_price,
            lines = items.len(),
            "order placed"
        );
        Ok(OrderReceipt { order, items })
    }
}
