#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use medimart_api::{
    auth::{AuthUser, Role},
    config::AppConfig,
    db,
    entities::{
        catalog::{category, pet_category, pet_product, product},
        healthcare::doctor::{self, DoctorType},
        ProductRef,
    },
    services::healthcare::prescription_service::ReviewDecision,
    AppState,
};

pub const TEST_JWT_SECRET: &str =
    "integration-test-secret-0123456789abcdefghijklmnopqrstuvwxyz-ABCDEFGHIJKLMNOP";

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps the in-memory database alive and shared.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = medimart_api::build_router(state.clone());
        Self { router, state }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub fn token_for(&self, user: &AuthUser) -> String {
        self.state
            .auth
            .issue_token(user.user_id, &user.name, user.role)
            .expect("issue test token")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// GET with a caller-supplied request id header.
    pub async fn router_request_with_id(&self, uri: &str, request_id: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("x-request-id", request_id)
            .body(Body::empty())
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_category(&self) -> category::Model {
        category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Category {}", Uuid::new_v4().simple())),
            description: Set(None),
            image_ref: Set(None),
        }
        .insert(self.db())
        .await
        .expect("seed category")
    }

    /// Seeds a general product in its own category. Names must be unique per test.
    pub async fn seed_product(
        &self,
        name: &str,
        price: Decimal,
        requires_prescription: bool,
    ) -> product::Model {
        let category = self.seed_category().await;
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(category.id),
            name: Set(name.to_string()),
            price: Set(price),
            description: Set(None),
            stock: Set(50),
            requires_prescription: Set(requires_prescription),
            image_ref: Set(None),
        }
        .insert(self.db())
        .await
        .expect("seed product")
    }

    pub async fn seed_pet_product(
        &self,
        name: &str,
        price: Decimal,
        prescription_required: bool,
    ) -> pet_product::Model {
        let category = pet_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("Pets {}", Uuid::new_v4().simple())),
            short_description: Set(None),
            image_ref: Set(None),
        }
        .insert(self.db())
        .await
        .expect("seed pet category");

        pet_product::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(category.id),
            name: Set(name.to_string()),
            price: Set(price),
            prescription_required: Set(prescription_required),
            image_ref: Set(None),
        }
        .insert(self.db())
        .await
        .expect("seed pet product")
    }

    pub async fn seed_doctor(
        &self,
        name: &str,
        doctor_type: DoctorType,
        fee: Decimal,
        user_id: Option<Uuid>,
    ) -> doctor::Model {
        doctor::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(name.to_string()),
            specialty: Set("General".to_string()),
            doctor_type: Set(doctor_type),
            languages: Set("Bangla,English".to_string()),
            location: Set("Dhaka".to_string()),
            fee: Set(fee),
            bkash_number: Set(None),
            bio: Set(None),
            image_ref: Set(None),
        }
        .insert(self.db())
        .await
        .expect("seed doctor")
    }

    /// A doctor login together with its linked profile.
    pub async fn doctor_account(&self, name: &str, fee: Decimal) -> (AuthUser, doctor::Model) {
        let user = user(name, Role::Doctor);
        let profile = self
            .seed_doctor(name, DoctorType::Human, fee, Some(user.user_id))
            .await;
        (user, profile)
    }

    /// Uploads a prescription for what is in `patient`'s cart and has `reviewer` approve it.
    pub async fn approve_cart_prescription(&self, patient: &AuthUser, reviewer: &AuthUser) {
        let detail = self
            .state
            .services
            .prescriptions
            .upload(patient.user_id, "rx/scan.jpg".to_string())
            .await
            .expect("upload prescription");
        self.state
            .services
            .prescriptions
            .review(reviewer, detail.prescription.id, ReviewDecision::Approved, None)
            .await
            .expect("approve prescription");
    }

    pub async fn add_to_cart(&self, patient: &AuthUser, product: ProductRef, quantity: i32) {
        self.state
            .services
            .cart
            .add_item(patient.user_id, product, quantity)
            .await
            .expect("add to cart");
    }
}

pub fn user(name: &str, role: Role) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        name: name.to_string(),
        role,
    }
}

pub fn patient(name: &str) -> AuthUser {
    user(name, Role::Patient)
}

pub fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

pub fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub async fn response_json(response: Response) -> Value {
    let collected = response
        .into_body()
        .collect()
        .await
        .expect("response body bytes");
    serde_json::from_slice(&collected.to_bytes()).expect("json response")
}
