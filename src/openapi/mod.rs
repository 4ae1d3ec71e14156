use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MediMart API",
        version = "1.0.0",
        description = r#"
# MediMart Pharmacy, Pet Shop and Healthcare Booking API

## Features

- **Catalog**: Medicines, healthcare products and pet products with search
- **Cart and Checkout**: Persistent carts; prescription-only products need an approved prescription
- **Prescriptions**: Upload for doctor review; rejection pulls the covered products from the cart
- **Appointments**: Doctor and vet bookings, one booking per doctor and slot
- **eLab**: Home sample collection for lab tests

## Authentication

Send the bearer token issued by the account system:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Failures return an `ErrorResponse`. A checkout blocked for missing prescriptions answers
`422` and lists the uncovered products in `details` as `kind:id` pairs.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "catalog", description = "Product and pet product catalog"),
        (name = "cart", description = "Persistent shopping cart"),
        (name = "orders", description = "Checkout and order history"),
        (name = "prescriptions", description = "Prescription upload and review"),
        (name = "doctors", description = "Doctor and vet directory"),
        (name = "appointments", description = "Appointment booking and payment"),
        (name = "doctor", description = "Doctor workspace"),
        (name = "elab", description = "Lab test scheduling"),
        (name = "dashboard", description = "Patient dashboard"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::api_status,
        crate::health_check,

        // Catalog
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::category_products,
        crate::handlers::catalog::get_product,
        crate::handlers::catalog::search_products,
        crate::handlers::catalog::list_pet_categories,
        crate::handlers::catalog::pet_category_products,

        // Cart, checkout, orders
        crate::handlers::commerce::carts::get_cart,
        crate::handlers::commerce::carts::add_to_cart,
        crate::handlers::commerce::carts::update_cart_item,
        crate::handlers::commerce::carts::remove_cart_item,
        crate::handlers::commerce::carts::merge_cart,
        crate::handlers::commerce::checkout::checkout,
        crate::handlers::commerce::orders::list_orders,
        crate::handlers::commerce::orders::get_order,

        // Prescriptions
        crate::handlers::prescriptions::upload_prescription,
        crate::handlers::prescriptions::list_prescriptions,
        crate::handlers::prescriptions::pending_prescriptions,
        crate::handlers::prescriptions::review_prescription,

        // Doctors and appointments
        crate::handlers::doctors::list_doctors,
        crate::handlers::doctors::list_vets,
        crate::handlers::doctors::get_doctor,
        crate::handlers::appointments::book_doctor,
        crate::handlers::appointments::book_vet,
        crate::handlers::appointments::book_pet_visit,
        crate::handlers::appointments::my_appointments,
        crate::handlers::appointments::pay_appointment,
        crate::handlers::appointments::doctor_appointments,
        crate::handlers::appointments::doctor_dashboard,
        crate::handlers::appointments::attach_prescription,

        // eLab
        crate::handlers::elab::list_tests,
        crate::handlers::elab::schedule_test,
        crate::handlers::elab::my_schedules,
        crate::handlers::elab::pay_schedule,
        crate::handlers::elab::all_schedules,
        crate::handlers::elab::upload_report,

        crate::handlers::dashboard::patient_dashboard,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::entities::ProductKind,
            crate::entities::ProductRef,
            crate::entities::MobilePayment,
            crate::entities::commerce::order::PaymentMethod,
            crate::entities::commerce::order::OrderStatus,
            crate::entities::healthcare::appointment::VisitType,
            crate::entities::healthcare::elab_schedule::LabTestType,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
