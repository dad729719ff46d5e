//! Cart and storefront settings.
//!
//! Every field has a serde default so partial config files work.

use crate::cart::MAX_QUANTITY_PER_ITEM;
use crate::money::Currency;
use crate::ui::DEFAULT_BADGE_CAP;
use serde::{Deserialize, Serialize};

/// Cart store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Currency every cart price must use.
    #[serde(default)]
    pub currency: Currency,

    /// Storage namespace for persisted carts.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Per-line quantity ceiling.
    #[serde(default = "default_max_quantity")]
    pub max_quantity_per_item: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            namespace: default_namespace(),
            max_quantity_per_item: default_max_quantity(),
        }
    }
}

fn default_namespace() -> String {
    "cart".to_string()
}

fn default_max_quantity() -> i64 {
    MAX_QUANTITY_PER_ITEM
}

/// Presentation policy for the cart drawer and header badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Render the cart icon, badge and drawer at all.
    #[serde(default = "default_true")]
    pub show_cart: bool,

    /// Open the drawer after a successful add.
    #[serde(default = "default_true")]
    pub open_on_add: bool,

    /// Badge counts above this render as "{cap}+".
    #[serde(default = "default_badge_cap")]
    pub badge_cap: i64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_cart: true,
            open_on_add: true,
            badge_cap: DEFAULT_BADGE_CAP,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_badge_cap() -> i64 {
    DEFAULT_BADGE_CAP
}
