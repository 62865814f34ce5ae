pub mod cart;
pub mod errors;
pub mod orders;
pub mod payments;
pub mod types;
