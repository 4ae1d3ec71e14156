//! End-to-end tests through the HTTP router.
//!
//! Tests cover:
//! - Request id propagation and status endpoints
//! - Bearer token handling on protected and public routes
//! - Prescription-gated checkout flow
//! - Role checks on the review queue
//! - Anonymous vet booking and slot conflicts

mod common;

use axum::http::{Method, StatusCode};
use common::{days_from_today, patient, response_json, user, TestApp};
use medimart_api::{auth::Role, entities::healthcare::doctor::DoctorType};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn status_echoes_request_id() {
    let app = TestApp::new().await;
    let response = app
        .router_request_with_id("/api/v1/status", "status-check-1")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "status-check-1"
    );
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/v1/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/cart", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/v1/cart", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A bad token is rejected even where anonymous access is allowed
    let response = app
        .request(Method::GET, "/api/v1/categories", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.request(Method::GET, "/api/v1/categories", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn prescription_gate_end_to_end() {
    let app = TestApp::new().await;
    let buyer = patient("Http Buyer");
    let (doctor, _) = app.doctor_account("Dr. Http", dec!(700)).await;
    let buyer_token = app.token_for(&buyer);
    let doctor_token = app.token_for(&doctor);
    let rx = app.seed_product("Http Antibiotic", dec!(45), true).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({ "product": { "kind": "general", "id": rx.id }, "quantity": 2 })),
            Some(&buyer_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["prescription_required"], true);

    let checkout = json!({ "payment_method": "Bkash" });
    let response = app
        .request(Method::POST, "/api/v1/checkout", Some(checkout.clone()), Some(&buyer_token))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["details"], format!("general:{}", rx.id));

    let response = app
        .request(
            Method::POST,
            "/api/v1/prescriptions",
            Some(json!({ "image_ref": "uploads/rx-http.jpg" })),
            Some(&buyer_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let prescription_id = body["data"]["prescription"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/prescriptions/{}/review", prescription_id),
            Some(json!({ "decision": "approved" })),
            Some(&doctor_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::POST, "/api/v1/checkout", Some(checkout), Some(&buyer_token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["order"]["is_paid"], true);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let response = app
        .request(Method::GET, "/api/v1/dashboard", None, Some(&buyer_token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["orders"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["prescriptions"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["cart_item_count"], 0);
}

#[tokio::test]
async fn empty_cart_checkout_is_a_bad_request() {
    let app = TestApp::new().await;
    let token = app.token_for(&patient("Empty"));

    let response = app
        .request(
            Method::POST,
            "/api/v1/checkout",
            Some(json!({ "payment_method": "Cash on Delivery" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pending_queue_is_forbidden_for_patients() {
    let app = TestApp::new().await;
    let patient_token = app.token_for(&patient("Curious"));
    let staff_token = app.token_for(&user("Desk", Role::Staff));

    let response = app
        .request(Method::GET, "/api/v1/prescriptions/pending", None, Some(&patient_token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(Method::GET, "/api/v1/prescriptions/pending", None, Some(&staff_token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_vet_booking_and_slot_conflict() {
    let app = TestApp::new().await;
    let vet = app
        .seed_doctor("Dr. Http Vet", DoctorType::Vet, dec!(500), None)
        .await;
    let uri = format!("/api/v1/vets/{}/appointments", vet.id);
    let booking = json!({
        "name": "Walk-in Owner",
        "phone": "01555555555",
        "date": days_from_today(3),
        "time": "11:00:00",
        "visit_type": "online",
    });

    let response = app
        .request(Method::POST, &uri, Some(booking.clone()), None)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert!(body["data"]["meeting_link"].as_str().is_some());
    assert!(body["data"]["patient_id"].is_null());

    let response = app.request(Method::POST, &uri, Some(booking), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request(
            Method::POST,
            &uri,
            Some(json!({
                "date": days_from_today(3),
                "time": "12:00:00",
                "visit_type": "in-person",
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_search_matches_case_insensitively() {
    let app = TestApp::new().await;
    app.seed_product("Paracetamol Http", dec!(2), false).await;
    app.seed_product("Ibuprofen Http", dec!(3), false).await;

    let response = app
        .request(Method::GET, "/api/v1/products/search?q=PARACET", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let hits = body["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Paracetamol Http");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["paths"]["/api/v1/checkout"].is_object());
}

#[tokio::test]
async fn oversized_cart_quantity_is_a_bad_request() {
    let app = TestApp::new().await;
    let token = app.token_for(&patient("Wholesale"));
    let pads = app.seed_product("Alcohol Pads", dec!(3), false).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({ "product": { "kind": "general", "id": pads.id }, "quantity": 1000 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.request(Method::GET, "/api/v1/cart", None, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["item_count"], 0);
}
