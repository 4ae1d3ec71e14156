pub mod appointment_service;
pub mod doctor_service;
pub mod elab_service;
pub mod prescription_service;

pub use appointment_service::AppointmentService;
pub use doctor_service::DoctorService;
pub use elab_service::ELabService;
pub use prescription_service::PrescriptionService;
