pub mod catalog;
pub mod commerce;
pub mod dashboard;
pub mod healthcare;
