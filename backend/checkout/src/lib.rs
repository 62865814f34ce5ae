//! Checkout flow of the cafe client.
//!
//! [`CheckoutSession`] holds the state shown on the checkout screen and runs
//! the payment confirmation poll for KHQR payments. At most one poll task is
//! alive per session; it is aborted on every exit from the awaiting state.

pub mod merchant;
pub mod policy;
pub mod session;
pub mod state;
pub mod validation;

pub use merchant::MerchantProfile;
pub use policy::PollPolicy;
pub use session::CheckoutSession;
pub use state::{CheckoutUiState, PaymentState};
