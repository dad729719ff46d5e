//! Shopping cart module.
//!
//! [`Cart`] is the plain value type; [`CartStore`] wraps one behind a lock and
//! publishes a [`CartUpdate`] after each committed change.

mod cart;
mod events;
mod pricing;
mod store;

pub use cart::{Cart, LineItem, QuantityUpdate, MAX_QUANTITY_PER_ITEM};
pub use events::{CartEvent, CartSnapshot, CartUpdate};
pub use pricing::CartTotals;
pub use store::CartStore;
