//! Checks run before an order is submitted.

use common_enums::OrderType;
use domain_types::errors::CheckoutError;

use crate::state::CheckoutUiState;

pub fn validate_order(state: &CheckoutUiState) -> Result<(), CheckoutError> {
    if state.phone_number.trim().is_empty() {
        return Err(CheckoutError::MissingPhoneNumber);
    }
    if state.order_type == OrderType::DineIn && state.table_number.trim().is_empty() {
        return Err(CheckoutError::MissingTableNumber);
    }
    if state.items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    Ok(())
}

/// Table numbers that are not numeric are sent as absent
pub fn parse_table_number(state: &CheckoutUiState) -> Option<u32> {
    match state.order_type {
        OrderType::DineIn => state.table_number.trim().parse().ok(),
        OrderType::Takeaway => None,
    }
}
