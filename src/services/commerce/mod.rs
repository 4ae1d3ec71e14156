pub mod cart_service;
pub mod checkout_service;
pub mod order_service;

pub use cart_service::{CartService, CartSnapshot, CartView};
pub use checkout_service::{CheckoutService, OrderReceipt};
pub use order_service::OrderService;
