//! Shared cart store.
//!
//! The store is the single owner of a [`Cart`]. Consumers hold an
//! `Arc<CartStore>`, read snapshots, call mutations and subscribe to changes.
//! Each mutation runs inside one lock scope (find, merge or append, rebuild
//! the snapshot), then subscribers are notified before the call returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cart::{Cart, CartEvent, CartSnapshot, CartTotals, CartUpdate, LineItem, QuantityUpdate};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::observer::{Observers, Subscription};
use crate::product::CartProduct;

struct State {
    cart: Cart,
    version: u64,
    snapshot: Arc<CartSnapshot>,
}

impl State {
    fn new(cart: Cart) -> Self {
        let snapshot = Arc::new(CartSnapshot::capture(&cart, 0));
        Self {
            cart,
            version: 0,
            snapshot,
        }
    }

    fn bump(&mut self) -> Arc<CartSnapshot> {
        self.version += 1;
        self.snapshot = Arc::new(CartSnapshot::capture(&self.cart, self.version));
        Arc::clone(&self.snapshot)
    }
}

/// Thread-safe, observable cart.
pub struct CartStore {
    state: Mutex<State>,
    observers: Observers<CartUpdate>,
}

impl CartStore {
    /// Create a store holding an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self::with_cart(Cart::new(currency))
    }

    /// Create a store around an existing cart (e.g. one loaded from storage).
    pub fn with_cart(cart: Cart) -> Self {
        Self {
            state: Mutex::new(State::new(cart)),
            observers: Observers::new(),
        }
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// Returns the line's new quantity. Invalid input leaves the cart
    /// unchanged and notifies nobody.
    pub fn add_item(&self, product: &CartProduct, quantity: i64) -> Result<i64, CommerceError> {
        self.mutate(|cart| {
            let line_quantity = cart.add_item(product, quantity)?;
            let event = CartEvent::ItemAdded {
                product_id: product.id.clone(),
                added: quantity,
                quantity: line_quantity,
            };
            Ok((line_quantity, Some(event)))
        })
        .inspect(|line_quantity| {
            tracing::debug!(
                product_id = %product.id,
                added = quantity,
                quantity = line_quantity,
                "item added"
            );
        })
        .inspect_err(|e| log_rejection(e, &product.id, quantity, "add to cart rejected"))
    }

    /// Add a single unit of `product`.
    pub fn add_one(&self, product: &CartProduct) -> Result<i64, CommerceError> {
        self.add_item(product, 1)
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove_item(&self, product_id: &ProductId) -> bool {
        let removed = self.mutate(|cart| {
            let event = cart.remove_item(product_id).map(|line| CartEvent::ItemRemoved {
                product_id: line.product_id,
                quantity: line.quantity,
            });
            Ok::<_, CommerceError>((event.is_some(), event))
        });
        matches!(removed, Ok(true))
    }

    /// Set the absolute quantity of a line; `<= 0` removes it.
    ///
    /// A product id that is not in the cart is a no-op.
    pub fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<QuantityUpdate, CommerceError> {
        self.mutate(|cart| {
            let update = cart.set_quantity(product_id, quantity)?;
            let event = match update {
                QuantityUpdate::Updated { from, to } => Some(CartEvent::QuantityChanged {
                    product_id: product_id.clone(),
                    from,
                    to,
                }),
                QuantityUpdate::Removed { from } => Some(CartEvent::ItemRemoved {
                    product_id: product_id.clone(),
                    quantity: from,
                }),
                QuantityUpdate::Unchanged | QuantityUpdate::Missing => None,
            };
            Ok((update, event))
        })
        .inspect_err(|e| log_rejection(e, product_id, quantity, "quantity change rejected"))
    }

    /// Remove every line. Returns how many lines were removed.
    pub fn clear(&self) -> usize {
        let removed = self.mutate(|cart| {
            let removed = cart.clear();
            let event = (removed > 0).then_some(CartEvent::Cleared { removed });
            Ok::<_, CommerceError>((removed, event))
        });
        removed.unwrap_or(0)
    }

    /// Replace the contents with `items`, validating every invariant.
    pub fn restore(&self, items: Vec<LineItem>) -> Result<(), CommerceError> {
        self.mutate(|cart| {
            let restored = Cart::from_items(cart.currency(), cart.max_quantity(), items)?;
            let count = restored.unique_item_count();
            *cart = restored;
            Ok(((), Some(CartEvent::Restored { items: count })))
        })
    }

    /// Sum of quantities.
    pub fn total_items(&self) -> i64 {
        self.state().cart.total_items()
    }

    /// Sum of `quantity * unit_price`.
    pub fn subtotal(&self) -> Money {
        self.state().cart.subtotal()
    }

    /// Count and subtotal read under one lock.
    pub fn totals(&self) -> CartTotals {
        self.state().cart.totals()
    }

    /// Latest snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        Arc::clone(&self.state().snapshot)
    }

    /// Copy of the current line items.
    pub fn items(&self) -> Vec<LineItem> {
        self.state().cart.items().to_vec()
    }

    /// Copy of one line.
    pub fn get_item(&self, product_id: &ProductId) -> Option<LineItem> {
        self.state().cart.get_item(product_id).cloned()
    }

    /// Check whether a product is in the cart.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.state().cart.contains(product_id)
    }

    /// Number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.state().cart.unique_item_count()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.state().cart.is_empty()
    }

    /// Cart currency.
    pub fn currency(&self) -> Currency {
        self.state().cart.currency()
    }

    /// Number of committed mutations so far.
    pub fn version(&self) -> u64 {
        self.state().version
    }

    /// Listen for committed mutations.
    ///
    /// The listener runs synchronously on the mutating thread, after the
    /// state lock is released, before the mutating call returns.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartUpdate) + Send + Sync + 'static,
    {
        self.observers.subscribe(listener)
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the cart under the lock. When it reports an event the
    /// snapshot is rebuilt in the same scope and subscribers are notified once
    /// the lock is released.
    fn mutate<R, F>(&self, f: F) -> Result<R, CommerceError>
    where
        F: FnOnce(&mut Cart) -> Result<(R, Option<CartEvent>), CommerceError>,
    {
        let (result, update) = {
            let mut state = self.state();
            let (result, event) = f(&mut state.cart)?;
            let update = event.map(|event| CartUpdate {
                event,
                snapshot: state.bump(),
            });
            (result, update)
        };

        if let Some(update) = update {
            tracing::debug!(
                version = update.snapshot.version,
                product_id = update.event.product_id().map(ProductId::as_str),
                total_items = update.snapshot.total_items,
                subtotal = update.snapshot.subtotal.amount_cents,
                "cart changed"
            );
            self.observers.notify(&update);
        }
        Ok(result)
    }
}

fn log_rejection(err: &CommerceError, product_id: &ProductId, quantity: i64, msg: &str) {
    if err.is_invalid_input() {
        tracing::warn!(product_id = %product_id, quantity, error = %err, "{}", msg);
    } else {
        tracing::error!(product_id = %product_id, quantity, error = %err, "{}", msg);
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("CartStore")
            .field("version", &state.version)
            .field("items", &state.cart.unique_item_count())
            .field("subscribers", &self.observers.len())
            .finish()
    }
}
