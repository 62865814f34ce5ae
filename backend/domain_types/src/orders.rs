//! Order wire models of the cafe backend.

use std::collections::HashMap;

use common_enums::{OrderType, Size};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{cart::CartItem, types::ApiEnvelope};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateOrderItem {
    pub menu_item_id: String,
    pub size: Size,
    pub quantity: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customizations: Option<HashMap<String, String>>,
}

impl From<&CartItem> for CreateOrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            menu_item_id: item.menu_item.id.clone(),
            size: item.size,
            quantity: item.quantity,
            customizations: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateOrderRequest {
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub items: Vec<CreateOrderItem>,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Set once the KHQR payment has been confirmed
    pub is_paid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub size: Size,
    pub quantity: u16,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub customizations: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub status: String,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub total_usd: Option<Decimal>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateOrderData {
    pub order: Order,
    #[serde(default)]
    pub message: Option<String>,
}

pub type CreateOrderResponse = ApiEnvelope<CreateOrderData>;
pub type CustomerOrdersResponse = ApiEnvelope<Vec<Order>>;
pub type OrdersQueueResponse = ApiEnvelope<Vec<Order>>;

/// Filter of the staff order queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrdersQueueQuery {
    pub status: String,
    pub limit: u32,
}

impl Default for OrdersQueueQuery {
    fn default() -> Self {
        Self {
            status: "pending,preparing,ready".to_string(),
            limit: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_order_request_omits_absent_fields() {
        let request = CreateOrderRequest {
            customer_phone: "012345678".into(),
            customer_name: None,
            items: vec![CreateOrderItem {
                menu_item_id: "m1".into(),
                size: Size::Small,
                quantity: 2,
                customizations: None,
            }],
            order_type: OrderType::Takeaway,
            table_number: None,
            notes: None,
            is_paid: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "customer_phone": "012345678",
                "items": [{"menu_item_id": "m1", "size": "regular", "quantity": 2}],
                "order_type": "takeaway",
                "is_paid": true,
            })
        );
    }

    #[test]
    fn parses_create_order_response() {
        let body = r#"{
            "success": true,
            "data": {
                "order": {
                    "id": "o1",
                    "order_number": "A-001",
                    "status": "pending",
                    "order_type": "dine_in",
                    "table_number": 4,
                    "total_usd": 5.5,
                    "createdAt": "2024-05-01T08:00:00Z",
                    "items": [{"name": "Iced Latte", "size": "large", "quantity": 1}],
                    "customer": {"id": "c1", "phone": "012345678"}
                }
            }
        }"#;
        let response: CreateOrderResponse = serde_json::from_str(body).unwrap();
        let order = response.into_data().unwrap().order;
        assert_eq!(order.order_type, Some(OrderType::DineIn));
        assert_eq!(order.items[0].size, Size::Large);
        assert_eq!(order.created_at.as_deref(), Some("2024-05-01T08:00:00Z"));
    }

    #[test]
    fn rejected_create_order_response_carries_message() {
        let response: CreateOrderResponse =
            serde_json::from_str(r#"{"success": false, "message": "Menu item not found"}"#)
                .unwrap();
        assert_eq!(response.data, None);
        assert_eq!(
            response.into_data(),
            Err(Some("Menu item not found".to_string()))
        );
    }
}
