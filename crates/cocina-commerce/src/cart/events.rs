//! Change notifications emitted by the cart store.

use crate::cart::{Cart, CartTotals, LineItem};
use crate::ids::ProductId;
use crate::money::Money;
use serde::Serialize;
use std::sync::Arc;

/// What a committed mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartEvent {
    /// Units were added, either as a new line or merged into an existing one.
    ItemAdded {
        product_id: ProductId,
        added: i64,
        quantity: i64,
    },
    /// A line's quantity was set.
    QuantityChanged {
        product_id: ProductId,
        from: i64,
        to: i64,
    },
    /// A line was removed.
    ItemRemoved { product_id: ProductId, quantity: i64 },
    /// Every line was removed.
    Cleared { removed: usize },
    /// Contents were replaced wholesale.
    Restored { items: usize },
}

impl CartEvent {
    /// The product the event is about, when it concerns a single line.
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            CartEvent::ItemAdded { product_id, .. }
            | CartEvent::QuantityChanged { product_id, .. }
            | CartEvent::ItemRemoved { product_id, .. } => Some(product_id),
            CartEvent::Cleared { .. } | CartEvent::Restored { .. } => None,
        }
    }
}

/// Immutable view of the cart taken in the same critical section as a
/// mutation, so items and aggregates always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    /// Monotonic counter, bumped on every committed mutation.
    pub version: u64,
    /// Line items in insertion order.
    pub items: Vec<LineItem>,
    /// Sum of quantities.
    pub total_items: i64,
    /// Sum of line totals.
    pub subtotal: Money,
}

impl CartSnapshot {
    pub(crate) fn capture(cart: &Cart, version: u64) -> Self {
        Self {
            version,
            items: cart.items().to_vec(),
            total_items: cart.total_items(),
            subtotal: cart.subtotal(),
        }
    }

    /// Aggregates of this snapshot.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_items: self.total_items,
            unique_items: self.items.len(),
            subtotal: self.subtotal,
        }
    }

    /// Check if the snapshot holds no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Delivered to store subscribers after each committed mutation.
#[derive(Debug, Clone)]
pub struct CartUpdate {
    /// What changed.
    pub event: CartEvent,
    /// State right after the change.
    pub snapshot: Arc<CartSnapshot>,
}
