//! Integration tests for prescription upload and doctor review.
//!
//! Tests cover:
//! - Upload links only the restricted products in the cart
//! - Pending queue access and ordering
//! - Review authority and single-review rule
//! - Cart cleanup after rejection

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::{patient, user, TestApp};
use medimart_api::{
    auth::Role,
    entities::{healthcare::prescription::PrescriptionStatus, ProductRef},
    errors::ServiceError,
    services::healthcare::prescription_service::ReviewDecision,
};
use rust_decimal_macros::dec;

#[tokio::test]
async fn upload_requires_restricted_items_in_cart() {
    let app = TestApp::new().await;
    let buyer = patient("Shila");
    let prescriptions = &app.state.services.prescriptions;

    assert_matches!(
        prescriptions.upload(buyer.user_id, "rx/a.jpg".into()).await,
        Err(ServiceError::InvalidOperation(_))
    );

    let plain = app.seed_product("Glucose Powder", dec!(40), false).await;
    app.add_to_cart(&buyer, ProductRef::General(plain.id), 1).await;
    assert_matches!(
        prescriptions.upload(buyer.user_id, "rx/a.jpg".into()).await,
        Err(ServiceError::InvalidOperation(_))
    );
    assert!(prescriptions.list_mine(buyer.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_rejects_blank_image_reference() {
    let app = TestApp::new().await;
    let buyer = patient("Milon");
    let rx = app.seed_product("Metformin", dec!(6), true).await;
    app.add_to_cart(&buyer, ProductRef::General(rx.id), 1).await;

    assert_matches!(
        app.state
            .services
            .prescriptions
            .upload(buyer.user_id, "   ".into())
            .await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn upload_covers_only_restricted_products() {
    let app = TestApp::new().await;
    let buyer = patient("Kona");
    let rx = app.seed_product("Ciprocin", dec!(15), true).await;
    let pet_rx = app.seed_pet_product("Vet Antibiotic", dec!(300), true).await;
    let plain = app.seed_product("Bandage", dec!(10), false).await;
    app.add_to_cart(&buyer, ProductRef::General(rx.id), 1).await;
    app.add_to_cart(&buyer, ProductRef::Pet(pet_rx.id), 1).await;
    app.add_to_cart(&buyer, ProductRef::General(plain.id), 1).await;

    let detail = app
        .state
        .services
        .prescriptions
        .upload(buyer.user_id, "rx/kona.png".into())
        .await
        .unwrap();

    assert_eq!(detail.prescription.status, PrescriptionStatus::Pending);
    assert_eq!(detail.prescription.doctor_id, None);
    assert_eq!(detail.products.len(), 2);
    assert!(detail.products.contains(&ProductRef::General(rx.id)));
    assert!(detail.products.contains(&ProductRef::Pet(pet_rx.id)));
    assert!(!detail.products.contains(&ProductRef::General(plain.id)));
}

#[tokio::test]
async fn pending_queue_is_for_clinical_staff_oldest_first() {
    let app = TestApp::new().await;
    let first = patient("First");
    let second = patient("Second");
    let rx = app.seed_product("Prednisolone", dec!(3), true).await;
    let prescriptions = &app.state.services.prescriptions;

    app.add_to_cart(&first, ProductRef::General(rx.id), 1).await;
    app.add_to_cart(&second, ProductRef::General(rx.id), 1).await;
    let older = prescriptions.upload(first.user_id, "rx/1.jpg".into()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let newer = prescriptions.upload(second.user_id, "rx/2.jpg".into()).await.unwrap();

    assert_matches!(
        prescriptions.pending_queue(&first).await,
        Err(ServiceError::Forbidden(_))
    );

    for role in [Role::Doctor, Role::Veterinarian, Role::Staff] {
        let queue = prescriptions.pending_queue(&user("Reviewer", role)).await.unwrap();
        let ids: Vec<_> = queue.iter().map(|d| d.prescription.id).collect();
        assert_eq!(ids, vec![older.prescription.id, newer.prescription.id]);
        assert_eq!(queue[0].products, vec![ProductRef::General(rx.id)]);
    }
}

#[tokio::test]
async fn review_requires_a_doctor_profile() {
    let app = TestApp::new().await;
    let buyer = patient("Ratul");
    let rx = app.seed_product("Clonazepam", dec!(9), true).await;
    app.add_to_cart(&buyer, ProductRef::General(rx.id), 1).await;
    let detail = app
        .state
        .services
        .prescriptions
        .upload(buyer.user_id, "rx/r.jpg".into())
        .await
        .unwrap();

    // Staff may see the queue but cannot sign off
    let staff = user("Front Desk", Role::Staff);
    assert_matches!(
        app.state
            .services
            .prescriptions
            .review(&staff, detail.prescription.id, ReviewDecision::Approved, None)
            .await,
        Err(ServiceError::Forbidden(_))
    );
}

#[tokio::test]
async fn approval_records_reviewer_and_is_final() {
    let app = TestApp::new().await;
    let buyer = patient("Anika");
    let (doctor, profile) = app.doctor_account("Dr. Mahmud", dec!(600)).await;
    let rx = app.seed_product("Esomeprazole", dec!(7), true).await;
    app.add_to_cart(&buyer, ProductRef::General(rx.id), 1).await;
    let prescriptions = &app.state.services.prescriptions;
    let detail = prescriptions.upload(buyer.user_id, "rx/an.jpg".into()).await.unwrap();

    let outcome = prescriptions
        .review(
            &doctor,
            detail.prescription.id,
            ReviewDecision::Approved,
            Some("twice daily".into()),
        )
        .await
        .unwrap();
    assert_eq!(outcome.prescription.status, PrescriptionStatus::Approved);
    assert_eq!(outcome.prescription.doctor_id, Some(profile.id));
    assert_eq!(outcome.prescription.notes.as_deref(), Some("twice daily"));
    assert_eq!(outcome.removed_cart_items, 0);

    assert_matches!(
        prescriptions
            .review(&doctor, detail.prescription.id, ReviewDecision::Rejected, None)
            .await,
        Err(ServiceError::InvalidOperation(_))
    );
    assert!(prescriptions.pending_queue(&doctor).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejection_removes_only_covered_restricted_lines() {
    let app = TestApp::new().await;
    let buyer = patient("Shanto");
    let (doctor, _) = app.doctor_account("Dr. Hoque", dec!(900)).await;
    let covered = app.seed_product("Diazepam", dec!(5), true).await;
    let plain = app.seed_product("Saline Spray", dec!(90), false).await;
    let later = app.seed_product("Codeine Syrup", dec!(60), true).await;

    app.add_to_cart(&buyer, ProductRef::General(covered.id), 2).await;
    app.add_to_cart(&buyer, ProductRef::General(plain.id), 1).await;
    let detail = app
        .state
        .services
        .prescriptions
        .upload(buyer.user_id, "rx/s.jpg".into())
        .await
        .unwrap();
    app.add_to_cart(&buyer, ProductRef::General(later.id), 1).await;

    let outcome = app
        .state
        .services
        .prescriptions
        .review(
            &doctor,
            detail.prescription.id,
            ReviewDecision::Rejected,
            Some("illegible".into()),
        )
        .await
        .unwrap();
    assert_eq!(outcome.prescription.status, PrescriptionStatus::Rejected);
    assert_eq!(outcome.removed_cart_items, 1);

    let view = app.state.services.cart.view(buyer.user_id).await.unwrap();
    let remaining: Vec<_> = view.items.iter().map(|l| l.product).collect();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.contains(&ProductRef::General(plain.id)));
    assert!(remaining.contains(&ProductRef::General(later.id)));
}

#[tokio::test]
async fn reviewing_unknown_prescription_is_not_found() {
    let app = TestApp::new().await;
    let (doctor, _) = app.doctor_account("Dr. Nobody", dec!(100)).await;

    assert_matches!(
        app.state
            .services
            .prescriptions
            .review(&doctor, uuid::Uuid::new_v4(), ReviewDecision::Approved, None)
            .await,
        Err(ServiceError::NotFound(_))
    );
}
