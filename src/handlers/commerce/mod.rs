/// Cart, checkout and order history handlers
pub mod carts;
pub mod checkout;
pub mod orders;

// Re-export route builders
pub use carts::carts_routes;
pub use checkout::checkout_routes;
pub use orders::orders_routes;
