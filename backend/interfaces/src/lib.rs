//! Seams between the checkout flow and the services it talks to.

pub mod order_service;
pub mod verification;

pub use order_service::OrderService;
pub use verification::PaymentVerifier;
