//! Presentation-side glue between the cart store and the drawer.
//!
//! Page templates and cards talk to a [`Storefront`]. It forwards mutations to
//! the store and applies the drawer policy (open after add, cart icon click)
//! without the store knowing about the UI.

use std::sync::Arc;

use crate::cart::{CartSnapshot, CartStore};
use crate::config::UiConfig;
use crate::error::CommerceError;
use crate::product::CartProduct;
use crate::ui::{badge_label, CartUi};

/// Cart store plus drawer, shared by every view on a page.
#[derive(Debug, Clone)]
pub struct Storefront {
    store: Arc<CartStore>,
    ui: Arc<CartUi>,
    config: UiConfig,
}

impl Storefront {
    /// Bundle a store and drawer under a presentation policy.
    pub fn new(store: Arc<CartStore>, ui: Arc<CartUi>, config: UiConfig) -> Self {
        Self { store, ui, config }
    }

    /// The cart store.
    pub fn store(&self) -> &Arc<CartStore> {
        &self.store
    }

    /// The drawer.
    pub fn ui(&self) -> &Arc<CartUi> {
        &self.ui
    }

    /// Presentation policy.
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Add-to-cart button handler.
    ///
    /// Opens the drawer after a successful add when `open_on_add` is set.
    pub fn add_to_cart(&self, product: &CartProduct, quantity: i64) -> Result<i64, CommerceError> {
        let line_quantity = self.store.add_item(product, quantity)?;
        if self.config.open_on_add && self.config.show_cart {
            self.ui.open();
        }
        Ok(line_quantity)
    }

    /// Header cart icon handler.
    pub fn cart_icon_clicked(&self) {
        if self.config.show_cart {
            self.ui.open();
        }
    }

    /// Header badge text; `None` hides the badge.
    pub fn header_badge(&self) -> Option<String> {
        if !self.config.show_cart {
            return None;
        }
        badge_label(self.store.total_items(), self.config.badge_cap)
    }

    /// Drawer contents, present only while the drawer is open.
    pub fn drawer(&self) -> Option<Arc<CartSnapshot>> {
        (self.config.show_cart && self.ui.is_open()).then(|| self.store.snapshot())
    }
}
