pub mod appointments;
pub mod catalog;
pub mod commerce;
pub mod common;
pub mod dashboard;
pub mod doctors;
pub mod elab;
pub mod prescriptions;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        catalog::CatalogService,
        commerce::{CartService, CheckoutService, OrderService},
        dashboard::DashboardService,
        healthcare::{AppointmentService, DoctorService, ELabService, PrescriptionService},
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderService>,
    pub prescriptions: Arc<PrescriptionService>,
    pub doctors: Arc<DoctorService>,
    pub appointments: Arc<AppointmentService>,
    pub elab: Arc<ELabService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        let cart = CartService::new(db_pool.clone());
        let orders = OrderService::new(db_pool.clone());
        let prescriptions = PrescriptionService::new(db_pool.clone());
        let appointments =
            AppointmentService::new(db_pool.clone(), config.meeting_link_base.clone());
        let elab = ELabService::new(db_pool.clone());

        let dashboard = DashboardService::new(
            prescriptions.clone(),
            orders.clone(),
            appointments.clone(),
            elab.clone(),
            cart.clone(),
        );

        Self {
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            cart: Arc::new(cart),
            checkout: Arc::new(CheckoutService::new(db_pool.clone())),
            orders: Arc::new(orders),
            prescriptions: Arc::new(prescriptions),
            doctors: Arc::new(DoctorService::new(db_pool)),
            appointments: Arc::new(appointments),
            elab: Arc::new(elab),
            dashboard: Arc::new(dashboard),
        }
    }
}
