use crate::{
    entities::{
        commerce::order,
        healthcare::{appointment, elab_schedule, prescription},
    },
    errors::ServiceError,
    services::{
        commerce::{CartService, OrderService},
        healthcare::{AppointmentService, ELabService, PrescriptionService},
    },
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Everything a patient sees on their landing page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatientDashboard {
    pub prescriptions: Vec<prescription::Model>,
    pub orders: Vec<order::Model>,
    pub appointments: Vec<appointment::Model>,
    pub elab_schedules: Vec<elab_schedule::Model>,
    pub cart_item_count: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    prescriptions: PrescriptionService,
    orders: OrderService,
    appointments: AppointmentService,
    elab: ELabService,
    carts: CartService,
}

impl DashboardService {
    pub fn new(
        prescriptions: PrescriptionService,
        orders: OrderService,
        appointments: AppointmentService,
        elab: ELabService,
        carts: CartService,
    ) -> Self {
        Self {
            prescriptions,
            orders,
            appointments,
            elab,
            carts,
        }
    }

    #[instrument(skip(self))]
    pub async fn patient_dashboard(&self, user_id: Uuid) -> Result<PatientDashboard, ServiceError> {
        let (prescriptions, orders, appointments, elab_schedules, cart_item_count) = tokio::try_join!(
            self.prescriptions.list_mine(user_id),
            self.orders.list_orders(user_id),
            self.appointments.patient_appointments(user_id),
            self.elab.list_mine(user_id),
            self.carts.item_count(user_id),
        )?;

        Ok(PatientDashboard {
            prescriptions,
            orders,
            appointments,
            elab_schedules,
            cart_item_count,
        })
    }
}
