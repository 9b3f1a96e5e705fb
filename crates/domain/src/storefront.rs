//! Storefront records the top-up form works with.

use serde::{Deserialize, Serialize};

use crate::form_value::FormValueMap;
use crate::ids::{GameId, PackageId, PaymentMethodId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: GameId,
    pub game_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A purchasable top-up amount for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePackage {
    pub package_id: PackageId,
    pub game_id: GameId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whole New Taiwan dollars
    pub price: u64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub payment_method_id: PaymentMethodId,
    pub method: String,
}

/// Normalized order handed to the order-creation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFormData {
    pub package_id: PackageId,
    pub payment_method_id: PaymentMethodId,
    /// Account details collected by the dynamic form
    pub game_data: FormValueMap,
    pub quantity: u32,
}

impl GamePackage {
    /// Price of `quantity` units of this package.
    pub fn total(&self, quantity: u32) -> u64 {
        self.price.saturating_mul(u64::from(quantity))
    }
}
