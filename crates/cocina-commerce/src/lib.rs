//! Shared shopping cart state for the Cocina storefront.
//!
//! This crate holds the cart every page view shares:
//!
//! - **Cart**: line items keyed by product id, quantities, integer-money totals
//! - **Store**: a thread-safe [`CartStore`] that notifies subscribers after each change
//! - **UI**: drawer visibility ([`CartUi`]) and the header badge label
//! - **Persistence**: per-session save and restore through `cocina-cache`
//!   (feature `storage`, on by default)
//!
//! # Example
//!
//! ```rust
//! use cocina_commerce::prelude::*;
//!
//! let store = CartStore::new(Currency::EUR);
//! let _sub = store.subscribe(|update: &CartUpdate| {
//!     println!("cart now holds {} items", update.snapshot.total_items);
//! });
//!
//! let apron = CartProduct::new("apron", "Delantal", Money::new(1800, Currency::EUR));
//! store.add_item(&apron, 2).unwrap();
//!
//! assert_eq!(store.total_items(), 2);
//! assert_eq!(store.subtotal().display(), "€36.00");
//! ```

pub mod cart;
pub mod config;
pub mod error;
pub mod ids;
pub mod money;
pub(crate) mod observer;
#[cfg(feature = "storage")]
pub mod persist;
pub mod product;
pub mod storefront;
pub mod ui;

pub use cart::{Cart, CartEvent, CartSnapshot, CartStore, CartTotals, CartUpdate, LineItem};
pub use config::{StoreConfig, UiConfig};
pub use error::CommerceError;
pub use ids::ProductId;
pub use money::{Currency, Money};
pub use observer::Subscription;
pub use product::CartProduct;
pub use storefront::Storefront;
pub use ui::{badge_label, CartUi, DrawerChange};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{
        Cart, CartEvent, CartSnapshot, CartStore, CartTotals, CartUpdate, LineItem,
        QuantityUpdate,
    };
    pub use crate::config::{StoreConfig, UiConfig};
    pub use crate::error::CommerceError;
    pub use crate::ids::ProductId;
    pub use crate::money::{Currency, Money};
    pub use crate::observer::Subscription;
    pub use crate::product::CartProduct;
    pub use crate::storefront::Storefront;
    pub use crate::ui::{badge_label, CartUi, DrawerChange};

    #[cfg(feature = "storage")]
    pub use crate::persist::{cart_key, load_cart, CartPersistence};
}
