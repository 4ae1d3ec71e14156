pub mod appointment;
pub mod doctor;
pub mod elab_schedule;
pub mod prescription;
pub mod prescription_product;
pub mod schedule;
