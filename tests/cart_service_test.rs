//! Integration tests for the persistent cart.
//!
//! Tests cover:
//! - Lazy cart creation and line upserts
//! - Quantity validation, per-line limit and updates
//! - Removal of single lines
//! - Merging of anonymous cart snapshots
//! - Prescription flags on the cart view

mod common;

use assert_matches::assert_matches;
use common::{patient, TestApp};
use medimart_api::{
    entities::ProductRef,
    errors::ServiceError,
    services::commerce::{
        cart_service::{SnapshotLine, MAX_LINE_QUANTITY},
        CartSnapshot,
    },
};
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn adding_same_product_twice_increments_one_line() {
    let app = TestApp::new().await;
    let user = patient("Rina");
    let napa = app.seed_product("Napa 500mg", dec!(10), false).await;

    app.add_to_cart(&user, ProductRef::General(napa.id), 2).await;
    let view = app
        .state
        .services
        .cart
        .add_item(user.user_id, ProductRef::General(napa.id), 3)
        .await
        .unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.total, dec!(50));
    assert!(!view.prescription_required);
}

#[tokio::test]
async fn general_and_pet_products_are_separate_lines() {
    let app = TestApp::new().await;
    let user = patient("Sabbir");
    let napa = app.seed_product("Napa Extra", dec!(5), false).await;
    let food = app.seed_pet_product("Cat Food", dec!(200), false).await;

    app.add_to_cart(&user, ProductRef::General(napa.id), 4).await;
    app.add_to_cart(&user, ProductRef::Pet(food.id), 1).await;

    let view = app.state.services.cart.view(user.user_id).await.unwrap();
    assert_eq!(view.item_count, 2);
    assert_eq!(view.total, dec!(220));
    assert_eq!(
        app.state.services.cart.item_count(user.user_id).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn rejects_non_positive_quantities() {
    let app = TestApp::new().await;
    let user = patient("Tanvir");
    let napa = app.seed_product("Napa Syrup", dec!(30), false).await;
    let cart = &app.state.services.cart;

    assert_matches!(
        cart.add_item(user.user_id, ProductRef::General(napa.id), 0).await,
        Err(ServiceError::ValidationError(_))
    );

    app.add_to_cart(&user, ProductRef::General(napa.id), 1).await;
    assert_matches!(
        cart.update_quantity(user.user_id, ProductRef::General(napa.id), -1).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let user = patient("Nadia");

    let result = app
        .state
        .services
        .cart
        .add_item(user.user_id, ProductRef::Pet(Uuid::new_v4()), 1)
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
    assert_eq!(
        app.state.services.cart.item_count(user.user_id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn update_and_remove_target_one_product() {
    let app = TestApp::new().await;
    let user = patient("Arif");
    let a = app.seed_product("Seclo 20", dec!(7), false).await;
    let b = app.seed_product("Fexo 120", dec!(9), false).await;
    app.add_to_cart(&user, ProductRef::General(a.id), 1).await;
    app.add_to_cart(&user, ProductRef::General(b.id), 1).await;
    let cart = &app.state.services.cart;

    let view = cart
        .update_quantity(user.user_id, ProductRef::General(a.id), 3)
        .await
        .unwrap();
    assert_eq!(view.total, dec!(30));

    let view = cart
        .remove_item(user.user_id, ProductRef::General(b.id))
        .await
        .unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].product, ProductRef::General(a.id));

    assert_matches!(
        cart.remove_item(user.user_id, ProductRef::General(b.id)).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        cart.update_quantity(user.user_id, ProductRef::General(b.id), 2).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn merge_adds_to_existing_lines_and_sums_duplicates() {
    let app = TestApp::new().await;
    let user = patient("Mitu");
    let a = app.seed_product("Monas 10", dec!(15), false).await;
    let food = app.seed_pet_product("Dog Treats", dec!(100), false).await;
    app.add_to_cart(&user, ProductRef::General(a.id), 1).await;

    let snapshot = CartSnapshot {
        items: vec![
            SnapshotLine { product: ProductRef::General(a.id), quantity: 2 },
            SnapshotLine { product: ProductRef::Pet(food.id), quantity: 1 },
            SnapshotLine { product: ProductRef::Pet(food.id), quantity: 1 },
        ],
    };
    let view = app
        .state
        .services
        .cart
        .merge_snapshot(user.user_id, snapshot)
        .await
        .unwrap();

    let qty = |p: ProductRef| view.items.iter().find(|l| l.product == p).map(|l| l.quantity);
    assert_eq!(qty(ProductRef::General(a.id)), Some(3));
    assert_eq!(qty(ProductRef::Pet(food.id)), Some(2));
    assert_eq!(view.total, dec!(245));
}

#[tokio::test]
async fn merge_with_unknown_product_changes_nothing() {
    let app = TestApp::new().await;
    let user = patient("Joy");
    let a = app.seed_product("Alatrol", dec!(4), false).await;
    app.add_to_cart(&user, ProductRef::General(a.id), 1).await;

    let snapshot = CartSnapshot {
        items: vec![
            SnapshotLine { product: ProductRef::General(a.id), quantity: 5 },
            SnapshotLine { product: ProductRef::General(Uuid::new_v4()), quantity: 1 },
        ],
    };
    let result = app
        .state
        .services
        .cart
        .merge_snapshot(user.user_id, snapshot)
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));

    let view = app.state.services.cart.view(user.user_id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 1);
}

#[tokio::test]
async fn view_flags_uncovered_prescription_products() {
    let app = TestApp::new().await;
    let user = patient("Lima");
    let antibiotic = app.seed_product("Azithro 500", dec!(35), true).await;
    let ear_drops = app.seed_pet_product("Ear Drops", dec!(42), true).await;
    let sanitizer = app.seed_product("Sanitizer", dec!(12), false).await;

    app.add_to_cart(&user, ProductRef::General(antibiotic.id), 1).await;
    app.add_to_cart(&user, ProductRef::Pet(ear_drops.id), 1).await;
    app.add_to_cart(&user, ProductRef::General(sanitizer.id), 1).await;

    let view = app.state.services.cart.view(user.user_id).await.unwrap();
    assert!(view.prescription_required);
    assert!(!view.has_approved_prescription);
    assert_eq!(view.uncovered_products.len(), 2);
    assert!(view
        .uncovered_products
        .contains(&ProductRef::Pet(ear_drops.id)));
    assert!(!view
        .uncovered_products
        .contains(&ProductRef::General(sanitizer.id)));
}

#[tokio::test]
async fn line_quantity_is_capped() {
    let app = TestApp::new().await;
    let user = patient("Bulk");
    let cart = &app.state.services.cart;
    let saline = app.seed_product("Saline 500ml", dec!(90), false).await;
    let product = ProductRef::General(saline.id);

    assert_matches!(
        cart.add_item(user.user_id, product, i32::MAX).await,
        Err(ServiceError::ValidationError(_))
    );

    cart.add_item(user.user_id, product, MAX_LINE_QUANTITY).await.unwrap();
    assert_matches!(
        cart.add_item(user.user_id, product, 1).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        cart.update_quantity(user.user_id, product, MAX_LINE_QUANTITY + 1).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        cart.merge_snapshot(
            user.user_id,
            CartSnapshot {
                items: vec![SnapshotLine { product, quantity: 1 }],
            },
        )
        .await,
        Err(ServiceError::ValidationError(_))
    );

    // The rejected increments leave the line readable and unchanged
    let view = cart.view(user.user_id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, MAX_LINE_QUANTITY);
}

#[tokio::test]
async fn approval_flag_requires_every_restricted_line_covered() {
    let app = TestApp::new().await;
    let user = patient("Dipa");
    let (doctor, _) = app.doctor_account("Dr. Cover", dec!(500)).await;
    let cart = &app.state.services.cart;
    let first = app.seed_product("Amoxicillin", dec!(20), true).await;
    let second = app.seed_product("Tramadol", dec!(30), true).await;
    let plain = app.seed_product("Cotton Roll", dec!(15), false).await;

    app.add_to_cart(&user, ProductRef::General(plain.id), 1).await;
    let view = cart.view(user.user_id).await.unwrap();
    assert!(!view.prescription_required);
    assert!(view.has_approved_prescription);

    app.add_to_cart(&user, ProductRef::General(first.id), 1).await;
    app.approve_cart_prescription(&user, &doctor).await;
    let view = cart.view(user.user_id).await.unwrap();
    assert!(view.has_approved_prescription);
    assert!(view.uncovered_products.is_empty());

    app.add_to_cart(&user, ProductRef::General(second.id), 1).await;
    let view = cart.view(user.user_id).await.unwrap();
    assert!(!view.has_approved_prescription);
    assert_eq!(view.uncovered_products, vec![ProductRef::General(second.id)]);
}
