//! Integration tests for cart-to-order checkout.
//!
//! Tests cover:
//! - Order totals and item snapshots
//! - Cart emptied on success
//! - Prescription gating per product
//! - Empty cart rejection
//! - Snapshot stability after catalog edits
//! - Rollback on failure and concurrent cart access

mod common;

use assert_matches::assert_matches;
use common::{patient, user, TestApp};
use medimart_api::{
    auth::Role,
    entities::{
        catalog::product,
        commerce::{
            order::{self, OrderStatus, PaymentMethod},
            order_item,
        },
        ProductRef,
    },
    errors::ServiceError,
};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, Set};

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[tokio::test]
async fn order_total_matches_snapshot_subtotals(#[case] lines: usize) {
    let app = TestApp::new().await;
    let buyer = patient("Karim");

    let mut expected = Decimal::ZERO;
    for i in 0..lines {
        let price = Decimal::from(10 * (i as i64 + 1));
        let quantity = i as i32 + 1;
        let item = app
            .seed_product(&format!("Vitamin {}", i), price, false)
            .await;
        app.add_to_cart(&buyer, ProductRef::General(item.id), quantity).await;
        expected += price * Decimal::from(quantity);
    }
    let cart_total = app.state.services.cart.view(buyer.user_id).await.unwrap().total;

    let receipt = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::CashOnDelivery)
        .await
        .unwrap();

    let snapshot_total: Decimal = receipt.items.iter().map(|i| i.subtotal()).sum();
    assert_eq!(receipt.order.total_price, expected);
    assert_eq!(receipt.order.total_price, cart_total);
    assert_eq!(snapshot_total, expected);
    assert_eq!(receipt.items.len(), lines);
    assert_eq!(receipt.order.status, OrderStatus::Pending);
    assert!(!receipt.order.is_paid);
}

#[tokio::test]
async fn checkout_empties_cart_and_creates_one_order() {
    let app = TestApp::new().await;
    let buyer = patient("Sumi");
    let a = app.seed_product("Ors Saline", dec!(6), false).await;
    let food = app.seed_pet_product("Fish Flakes", dec!(80), false).await;
    app.add_to_cart(&buyer, ProductRef::General(a.id), 10).await;
    app.add_to_cart(&buyer, ProductRef::Pet(food.id), 1).await;

    let receipt = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::Bkash)
        .await
        .unwrap();

    assert!(receipt.order.is_paid);
    assert_eq!(receipt.order.total_price, dec!(140));
    assert_eq!(
        app.state.services.cart.item_count(buyer.user_id).await.unwrap(),
        0
    );
    assert_eq!(order::Entity::find().count(app.db()).await.unwrap(), 1);
    assert_eq!(order_item::Entity::find().count(app.db()).await.unwrap(), 2);
}

#[tokio::test]
async fn empty_cart_cannot_check_out() {
    let app = TestApp::new().await;
    let buyer = patient("Nila");
    let checkout = &app.state.services.checkout;

    // No cart at all
    assert_matches!(
        checkout.checkout(buyer.user_id, PaymentMethod::Nogod).await,
        Err(ServiceError::EmptyCart)
    );

    // Cart that was emptied
    let a = app.seed_product("Zinc", dec!(3), false).await;
    app.add_to_cart(&buyer, ProductRef::General(a.id), 1).await;
    app.state
        .services
        .cart
        .remove_item(buyer.user_id, ProductRef::General(a.id))
        .await
        .unwrap();
    assert_matches!(
        checkout.checkout(buyer.user_id, PaymentMethod::Nogod).await,
        Err(ServiceError::EmptyCart)
    );
    assert_eq!(order::Entity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn restricted_product_without_prescription_is_blocked() {
    let app = TestApp::new().await;
    let buyer = patient("Hasan");
    let antibiotic = app.seed_product("Cef-3", dec!(50), true).await;
    let plain = app.seed_product("Cotton", dec!(5), false).await;
    app.add_to_cart(&buyer, ProductRef::General(antibiotic.id), 1).await;
    app.add_to_cart(&buyer, ProductRef::General(plain.id), 1).await;

    let result = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::CashOnDelivery)
        .await;

    assert_matches!(result, Err(ServiceError::PrescriptionRequired(missing)) => {
        assert_eq!(missing, vec![ProductRef::General(antibiotic.id)]);
    });
    // Nothing changed
    assert_eq!(
        app.state.services.cart.item_count(buyer.user_id).await.unwrap(),
        2
    );
    assert_eq!(order::Entity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn pending_prescription_does_not_unlock_checkout() {
    let app = TestApp::new().await;
    let buyer = patient("Rupa");
    let drops = app.seed_pet_product("Eye Drops", dec!(70), true).await;
    app.add_to_cart(&buyer, ProductRef::Pet(drops.id), 1).await;
    app.state
        .services
        .prescriptions
        .upload(buyer.user_id, "rx/pending.jpg".into())
        .await
        .unwrap();

    let result = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::Bkash)
        .await;
    assert_matches!(result, Err(ServiceError::PrescriptionRequired(_)));
}

#[tokio::test]
async fn approved_prescription_unlocks_checkout() {
    let app = TestApp::new().await;
    let buyer = patient("Imran");
    let (doctor, _) = app.doctor_account("Dr. Alam", dec!(700)).await;
    let antibiotic = app.seed_product("Amoxi 250", dec!(18), true).await;
    app.add_to_cart(&buyer, ProductRef::General(antibiotic.id), 2).await;
    app.approve_cart_prescription(&buyer, &doctor).await;

    let receipt = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::CashOnDelivery)
        .await
        .unwrap();
    assert_eq!(receipt.order.total_price, dec!(36));
}

#[tokio::test]
async fn coverage_is_checked_per_product() {
    let app = TestApp::new().await;
    let buyer = patient("Tania");
    let (doctor, _) = app.doctor_account("Dr. Sultana", dec!(500)).await;
    let covered = app.seed_product("Losartan", dec!(8), true).await;
    let uncovered = app.seed_product("Tramadol", dec!(20), true).await;

    app.add_to_cart(&buyer, ProductRef::General(covered.id), 1).await;
    app.approve_cart_prescription(&buyer, &doctor).await;
    app.add_to_cart(&buyer, ProductRef::General(uncovered.id), 1).await;

    let result = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::Bkash)
        .await;
    assert_matches!(result, Err(ServiceError::PrescriptionRequired(missing)) => {
        assert_eq!(missing, vec![ProductRef::General(uncovered.id)]);
    });
}

#[tokio::test]
async fn order_items_keep_name_and_price_after_catalog_edit() {
    let app = TestApp::new().await;
    let buyer = patient("Babu");
    let item = app.seed_product("Calbo D", dec!(12), false).await;
    app.add_to_cart(&buyer, ProductRef::General(item.id), 3).await;
    let receipt = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::CashOnDelivery)
        .await
        .unwrap();

    let mut edit: product::ActiveModel = item.into();
    edit.name = Set("Calbo D Forte".to_string());
    edit.price = Set(dec!(99));
    edit.update(app.db()).await.unwrap();

    let stored = app
        .state
        .services
        .orders
        .get_order(buyer.user_id, receipt.order.id)
        .await
        .unwrap();
    assert_eq!(stored.items[0].name, "Calbo D");
    assert_eq!(stored.items[0].price, dec!(12));
    assert_eq!(stored.order.total_price, dec!(36));
}

#[tokio::test]
async fn orders_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let buyer = patient("Owner");
    let other = user("Staffer", Role::Staff);
    let item = app.seed_product("Gauze", dec!(2), false).await;
    app.add_to_cart(&buyer, ProductRef::General(item.id), 1).await;
    let receipt = app
        .state
        .services
        .checkout
        .checkout(buyer.user_id, PaymentMethod::CashOnDelivery)
        .await
        .unwrap();

    assert_matches!(
        app.state
            .services
            .orders
            .get_order(other.user_id, receipt.order.id)
            .await,
        Err(ServiceError::NotFound(_))
    );
    assert_eq!(
        app.state.services.orders.list_orders(buyer.user_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn failed_item_write_rolls_back_the_whole_checkout() {
    let app = TestApp::new().await;
    let buyer = patient("Rollback");
    let soap = app.seed_product("Antiseptic Soap", dec!(55), false).await;
    app.add_to_cart(&buyer, ProductRef::General(soap.id), 3).await;

    app.db()
        .execute_unprepared(
            "CREATE TRIGGER reject_order_items BEFORE INSERT ON order_items \
             BEGIN SELECT RAISE(ABORT, 'order items unavailable'); END;",
        )
        .await
        .unwrap();

    let checkout = &app.state.services.checkout;
    assert_matches!(
        checkout.checkout(buyer.user_id, PaymentMethod::Bkash).await,
        Err(ServiceError::DatabaseError(_))
    );
    assert_eq!(order::Entity::find().count(app.db()).await.unwrap(), 0);
    let view = app.state.services.cart.view(buyer.user_id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 3);

    app.db()
        .execute_unprepared("DROP TRIGGER reject_order_items")
        .await
        .unwrap();
    let receipt = checkout.checkout(buyer.user_id, PaymentMethod::Bkash).await.unwrap();
    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].quantity, 3);
}

#[tokio::test]
async fn concurrent_checkouts_place_one_order() {
    let app = TestApp::new().await;
    let buyer = patient("Double Tap");
    let syrup = app.seed_product("Cough Syrup", dec!(85), false).await;
    app.add_to_cart(&buyer, ProductRef::General(syrup.id), 2).await;

    let checkout = &app.state.services.checkout;
    let (first, second) = tokio::join!(
        checkout.checkout(buyer.user_id, PaymentMethod::Bkash),
        checkout.checkout(buyer.user_id, PaymentMethod::Bkash),
    );

    let placed = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(placed, 1);
    assert!(
        matches!(first, Err(ServiceError::EmptyCart))
            || matches!(second, Err(ServiceError::EmptyCart))
    );
    assert_eq!(order::Entity::find().count(app.db()).await.unwrap(), 1);
    assert_eq!(order_item::Entity::find().count(app.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn units_added_during_checkout_are_not_lost() {
    let app = TestApp::new().await;
    let buyer = patient("Late Add");
    let gauze = app.seed_product("Gauze Pad", dec!(8), false).await;
    let product = ProductRef::General(gauze.id);
    app.add_to_cart(&buyer, product, 1).await;

    let (receipt, added) = tokio::join!(
        app.state
            .services
            .checkout
            .checkout(buyer.user_id, PaymentMethod::CashOnDelivery),
        app.state.services.cart.add_item(buyer.user_id, product, 2),
    );
    let receipt = receipt.unwrap();
    added.unwrap();

    // Each unit ends up either in the order or still in the cart
    let ordered: i32 = receipt.items.iter().map(|i| i.quantity).sum();
    let view = app.state.services.cart.view(buyer.user_id).await.unwrap();
    let remaining: i32 = view.items.iter().map(|l| l.quantity).sum();
    assert_eq!(ordered + remaining, 3);
}
