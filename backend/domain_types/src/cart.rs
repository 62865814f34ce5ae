//! Menu items and the customer's cart.

use common_enums::Size;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Surcharge applied when a menu item has no explicit medium price
const MEDIUM_SURCHARGE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
/// Surcharge applied when a menu item has no explicit large price
const LARGE_SURCHARGE: Decimal = Decimal::ONE;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_kh: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub base_price: Decimal,
    #[serde(default = "default_true")]
    pub has_sizes: bool,
    #[serde(default)]
    pub price_medium: Option<Decimal>,
    #[serde(default)]
    pub price_large: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub category_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl MenuItem {
    /// Price in USD of one item of the given size
    pub fn price_for(&self, size: Size) -> Decimal {
        match size {
            Size::Small => self.base_price,
            Size::Medium => self
                .price_medium
                .unwrap_or(self.base_price + MEDIUM_SURCHARGE),
            Size::Large => self.price_large.unwrap_or(self.base_price + LARGE_SURCHARGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CartItem {
    pub id: String,
    pub menu_item: MenuItem,
    #[serde(default)]
    pub size: Size,
    pub quantity: u16,
}

impl CartItem {
    pub fn unit_price(&self) -> Decimal {
        self.menu_item.price_for(self.size)
    }

    pub fn total_price(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// Sum of every line of the cart, in USD
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::total_price).sum()
}
