use common_enums::{OrderType, PaymentMethod};
use domain_types::{cart::CartItem, orders::Order};
use khqr::PaymentFingerprint;
use rust_decimal::Decimal;
use serde::Serialize;

/// Progress of a KHQR payment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentState {
    #[default]
    Idle,
    /// QR code is displayed and the poll loop is running
    AwaitingPayment { attempts: u32 },
    Confirmed,
    TimedOut,
    /// The session was torn down while a payment was pending
    Cancelled,
}

impl PaymentState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::AwaitingPayment { .. })
    }
}

/// Everything the checkout screen renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckoutUiState {
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
    pub order_type: OrderType,
    pub table_number: String,
    pub phone_number: String,
    pub customer_name: String,
    pub selected_payment_method: PaymentMethod,
    pub khqr_string: Option<String>,
    pub payment_md5: Option<PaymentFingerprint>,
    pub show_khqr: bool,
    pub is_payment_confirmed: bool,
    pub deep_link_url: Option<String>,
    pub deep_link_fallbacks: Vec<String>,
    pub payment_state: PaymentState,
    pub is_submitting: bool,
    pub error: Option<String>,
    pub success_order: Option<Order>,
}

impl CheckoutUiState {
    /// Drops the displayed payment, keeping the cart and customer details
    pub(crate) fn clear_payment(&mut self, payment_state: PaymentState) {
        self.khqr_string = None;
        self.payment_md5 = None;
        self.show_khqr = false;
        self.deep_link_url = None;
        self.deep_link_fallbacks.clear();
        self.payment_state = payment_state;
    }
}
