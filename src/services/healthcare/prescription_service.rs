use crate::{
    auth::AuthUser,
    entities::{
        commerce::cart_item,
        healthcare::{
            doctor,
            prescription::{self, PrescriptionStatus},
            prescription_product,
        },
        ProductRef,
    },
    errors::ServiceError,
    services::{
        catalog,
        commerce::cart_service::{find_cart, load_lines, lock_cart, restricted_products},
    },
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    JoinType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Products covered by at least one approved prescription of `user_id`.
pub async fn covered_products<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<BTreeSet<ProductRef>, ServiceError> {
    let links = prescription_product::Entity::find()
        .join(
            JoinType::InnerJoin,
            prescription_product::Relation::Prescription.def(),
        )
        .filter(prescription::Column::UserId.eq(user_id))
        .filter(prescription::Column::Status.eq(PrescriptionStatus::Approved))
        .all(conn)
        .await?;
    Ok(links.iter().map(|l| l.product_ref()).collect())
}

/// Restricted products that `covered` does not account for, in stable order.
pub fn missing_coverage(
    restricted: &BTreeSet<ProductRef>,
    covered: &BTreeSet<ProductRef>,
) -> Vec<ProductRef> {
    restricted.difference(covered).copied().collect()
}

/// Newest approved prescription of a patient, if any.
pub async fn latest_approved<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<prescription::Model>, ServiceError> {
    Ok(prescription::Entity::find()
        .filter(prescription::Column::UserId.eq(user_id))
        .filter(prescription::Column::Status.eq(PrescriptionStatus::Approved))
        .order_by_desc(prescription::Column::UploadedAt)
        .one(conn)
        .await?)
}

/// Doctor profile linked to a login, if any.
pub async fn doctor_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<doctor::Model>, ServiceError> {
    Ok(doctor::Entity::find()
        .filter(doctor::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for PrescriptionStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => PrescriptionStatus::Approved,
            ReviewDecision::Rejected => PrescriptionStatus::Rejected,
        }
    }
}

/// Prescription together with the products it covers
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrescriptionDetail {
    pub prescription: prescription::Model,
    pub products: Vec<ProductRef>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewOutcome {
    pub prescription: prescription::Model,
    /// Cart lines removed from the patient's cart on rejection
    pub removed_cart_items: u64,
}

/// Upload, listing and doctor review of prescriptions
#[derive(Clone)]
pub struct PrescriptionService {
    db: Arc<DatabaseConnection>,
}

impl PrescriptionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Records a pending prescription covering the restricted products now in the cart.
    #[instrument(skip(self))]
    pub async fn upload(
        &self,
        user_id: Uuid,
        image_ref: String,
    ) -> Result<PrescriptionDetail, ServiceError> {
        let image_ref = image_ref.trim().to_string();
        if image_ref.is_empty() {
            return Err(ServiceError::ValidationError(
                "prescription image is required".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let restricted = match find_cart(&txn, user_id).await? {
            Some(cart) => restricted_products(&load_lines(&txn, cart.id).await?),
            None => BTreeSet::new(),
        };
        if restricted.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "No prescription-required products in the cart".to_string(),
            ));
        }

        let prescription = prescription::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            image_ref: Set(image_ref),
            uploaded_at: Set(Utc::now()),
            status: Set(PrescriptionStatus::Pending),
            doctor_id: Set(None),
            notes: Set(None),
        }
        .insert(&txn)
        .await?;

        for product in &restricted {
            prescription_product::ActiveModel {
                id: Set(Uuid::new_v4()),
                prescription_id: Set(prescription.id),
                product_kind: Set(product.kind()),
                product_id: Set(product.id()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(
            prescription_id = %prescription.id,
            user_id = %user_id,
            covered = restricted.len(),
            "prescription uploaded"
        );
        Ok(PrescriptionDetail {
            prescription,
            products: restricted.into_iter().collect(),
        })
    }

    /// The user's prescriptions, newest first.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<prescription::Model>, ServiceError> {
        Ok(prescription::Entity::find()
            .filter(prescription::Column::UserId.eq(user_id))
            .order_by_desc(prescription::Column::UploadedAt)
            .all(&*self.db)
            .await?)
    }

    /// Pending prescriptions, oldest first. Clinical staff only.
    #[instrument(skip(self, reviewer), fields(reviewer = %reviewer.user_id))]
    pub async fn pending_queue(
        &self,
        reviewer: &AuthUser,
    ) -> Result<Vec<PrescriptionDetail>, ServiceError> {
        if !reviewer.role.is_clinical_staff() {
            return Err(ServiceError::Forbidden(
                "only doctors and staff may view pending prescriptions".to_string(),
            ));
        }

        let pending = prescription::Entity::find()
            .filter(prescription::Column::Status.eq(PrescriptionStatus::Pending))
            .order_by_asc(prescription::Column::UploadedAt)
            .order_by_asc(prescription::Column::Id)
            .find_with_related(prescription_product::Entity)
            .all(&*self.db)
            .await?;

        Ok(pending
            .into_iter()
            .map(|(prescription, links)| PrescriptionDetail {
                prescription,
                products: links.iter().map(|l| l.product_ref()).collect(),
            })
            .collect())
    }

    /// Approves or rejects a pending prescription.
    ///
    /// Rejection also removes the covered restricted products from the
    /// patient's cart, in the same transaction.
    #[instrument(skip(self, reviewer, notes), fields(reviewer = %reviewer.user_id))]
    pub async fn review(
        &self,
        reviewer: &AuthUser,
        prescription_id: Uuid,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<ReviewOutcome, ServiceError> {
        let txn = self.db.begin().await?;

        let doctor = doctor_for_user(&txn, reviewer.user_id).await?.ok_or_else(|| {
            ServiceError::Forbidden("a doctor profile is required to review prescriptions".into())
        })?;

        let prescription = prescription::Entity::find_by_id(prescription_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Prescription {} not found", prescription_id))
            })?;

        if prescription.status != PrescriptionStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "Prescription {} has already been reviewed",
                prescription_id
            )));
        }

        let patient_id = prescription.user_id;
        let mut active: prescription::ActiveModel = prescription.into();
        active.status = Set(decision.into());
        active.doctor_id = Set(Some(doctor.id));
        active.notes = Set(notes.filter(|n| !n.trim().is_empty()));
        let prescription = active.update(&txn).await?;

        let removed_cart_items = match decision {
            ReviewDecision::Approved => 0,
            ReviewDecision::Rejected => {
                self.remove_rejected_from_cart(&txn, patient_id, prescription.id)
                    .await?
            }
        };

        txn.commit().await?;

        info!(
            prescription_id = %prescription.id,
            doctor_id = %doctor.id,
            status = ?prescription.status,
            removed_cart_items,
            "prescription reviewed"
        );
        Ok(ReviewOutcome {
            prescription,
            removed_cart_items,
        })
    }

    async fn remove_rejected_from_cart<C: ConnectionTrait>(
        &self,
        conn: &C,
        patient_id: Uuid,
        prescription_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let Some(cart) = lock_cart(conn, patient_id).await? else {
            return Ok(0);
        };

        let covered: BTreeSet<ProductRef> = prescription_product::Entity::find()
            .filter(prescription_product::Column::PrescriptionId.eq(prescription_id))
            .all(conn)
            .await?
            .iter()
            .map(|l| l.product_ref())
            .collect();

        let items = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .all(conn)
            .await?;
        let candidates: Vec<&cart_item::Model> = items
            .iter()
            .filter(|i| covered.contains(&i.product_ref()))
            .collect();
        if candidates.is_empty() {
            return Ok(0);
        }

        // Only products that still require a prescription are pulled.
        let entries = catalog::resolve_many(conn, candidates.iter().map(|i| i.product_ref())).await?;
        let doomed: Vec<Uuid> = candidates
            .iter()
            .filter(|i| {
                entries
                    .get(&i.product_ref())
                    .map(|e| e.requires_prescription)
                    .unwrap_or(false)
            })
            .map(|i| i.id)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::Id.is_in(doomed))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}
