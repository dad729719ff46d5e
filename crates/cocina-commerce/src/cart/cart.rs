//! Cart and line item types.
//!
//! [`Cart`] is plain data plus the invariants: one line per product id,
//! positive quantities, prices in the cart currency, and a subtotal that fits
//! in an `i64`. Every mutation either fully applies or leaves the cart
//! untouched. Sharing and notification live in [`CartStore`](crate::cart::CartStore).

use crate::cart::CartTotals;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::product::CartProduct;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// Outcome of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// Quantity changed.
    Updated { from: i64, to: i64 },
    /// Requested quantity was already set.
    Unchanged,
    /// Non-positive quantity removed the line.
    Removed { from: i64 },
    /// No line with that product id.
    Missing,
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
    currency: Currency,
    max_quantity: i64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
            max_quantity: MAX_QUANTITY_PER_ITEM,
        }
    }

    /// Override the per-line quantity ceiling.
    pub fn with_max_quantity(mut self, max_quantity: i64) -> Self {
        self.max_quantity = max_quantity.max(1);
        self
    }

    /// Build a cart from existing line items, checking every invariant.
    pub fn from_items(
        currency: Currency,
        max_quantity: i64,
        items: Vec<LineItem>,
    ) -> Result<Self, CommerceError> {
        let mut cart = Self::new(currency).with_max_quantity(max_quantity);
        for (idx, item) in items.iter().enumerate() {
            cart.check_line(item)?;
            if items[..idx].iter().any(|i| i.product_id == item.product_id) {
                return Err(CommerceError::DuplicateItem(item.product_id.to_string()));
            }
        }
        Self::check_totals(&items, currency)?;
        cart.items = items;
        Ok(cart)
    }

    /// Add `quantity` of a product.
    ///
    /// An existing line for the same product id absorbs the quantity and
    /// takes the latest name, price and image; otherwise a new line is
    /// appended. Returns the resulting line quantity.
    pub fn add_item(&mut self, product: &CartProduct, quantity: i64) -> Result<i64, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        product.validate()?;
        self.check_currency(&product.unit_price)?;

        let mut next = self.items.clone();
        let new_quantity = match next.iter_mut().find(|i| i.product_id == product.id) {
            Some(existing) => {
                let merged = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CommerceError::Overflow)?;
                self.check_limit(merged)?;
                existing.refresh_from(product);
                existing.quantity = merged;
                merged
            }
            None => {
                self.check_limit(quantity)?;
                next.push(LineItem::new(product, quantity));
                quantity
            }
        };

        self.commit(next)?;
        Ok(new_quantity)
    }

    /// Set the absolute quantity of an existing line.
    ///
    /// A non-positive quantity removes the line. A missing product id is a
    /// no-op.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<QuantityUpdate, CommerceError> {
        let Some(idx) = self.position(product_id) else {
            return Ok(QuantityUpdate::Missing);
        };

        if quantity <= 0 {
            let removed = self.items.remove(idx);
            return Ok(QuantityUpdate::Removed {
                from: removed.quantity,
            });
        }

        self.check_limit(quantity)?;
        let from = self.items[idx].quantity;
        if from == quantity {
            return Ok(QuantityUpdate::Unchanged);
        }

        let mut next = self.items.clone();
        next[idx].quantity = quantity;
        self.commit(next)?;
        Ok(QuantityUpdate::Updated { from, to: quantity })
    }

    /// Remove a line. Returns the removed line, if any.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Option<LineItem> {
        let idx = self.position(product_id)?;
        Some(self.items.remove(idx))
    }

    /// Remove all lines. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Cart currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Per-line quantity ceiling.
    pub fn max_quantity(&self) -> i64 {
        self.max_quantity
    }

    /// Sum of quantities.
    pub fn total_items(&self) -> i64 {
        // Commits reject carts whose totals overflow, so saturation never
        // kicks in for a cart built through this API.
        self.items
            .iter()
            .fold(0_i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Sum of `quantity * unit_price`.
    pub fn subtotal(&self) -> Money {
        let cents = self
            .items
            .iter()
            .fold(0_i64, |acc, i| acc.saturating_add(i.line_total().amount_cents));
        Money::new(cents, self.currency)
    }

    /// Count and subtotal together.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_items: self.total_items(),
            unique_items: self.items.len(),
            subtotal: self.subtotal(),
        }
    }

    /// Number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by product id.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Check whether a product is in the cart.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.position(product_id).is_some()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items.iter().position(|i| &i.product_id == product_id)
    }

    fn commit(&mut self, next: Vec<LineItem>) -> Result<(), CommerceError> {
        Self::check_totals(&next, self.currency)?;
        self.items = next;
        Ok(())
    }

    /// Both aggregates must fit in an `i64`.
    fn check_totals(items: &[LineItem], currency: Currency) -> Result<(), CommerceError> {
        items
            .iter()
            .try_fold(0_i64, |acc, item| acc.checked_add(item.quantity))
            .ok_or(CommerceError::Overflow)?;

        let lines = items
            .iter()
            .map(|item| item.unit_price.try_multiply(item.quantity))
            .collect::<Option<Vec<Money>>>()
            .ok_or(CommerceError::Overflow)?;
        Money::try_sum(lines.iter(), currency).ok_or(CommerceError::Overflow)?;
        Ok(())
    }

    fn check_limit(&self, quantity: i64) -> Result<(), CommerceError> {
        if quantity > self.max_quantity {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                self.max_quantity,
            ));
        }
        Ok(())
    }

    fn check_currency(&self, price: &Money) -> Result<(), CommerceError> {
        if price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: price.currency.code().to_string(),
            });
        }
        Ok(())
    }

    fn check_line(&self, item: &LineItem) -> Result<(), CommerceError> {
        if item.product_id.is_blank() {
            return Err(CommerceError::MissingField("id"));
        }
        if item.name.trim().is_empty() {
            return Err(CommerceError::MissingField("name"));
        }
        if item.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(item.quantity));
        }
        if item.unit_price.is_negative() {
            return Err(CommerceError::InvalidPrice(
                item.unit_price.display_amount(),
            ));
        }
        self.check_limit(item.quantity)?;
        self.check_currency(&item.unit_price)
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product id; unique within a cart.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity, always positive.
    pub quantity: i64,
    /// Image reference.
    pub image: Option<String>,
}

impl LineItem {
    /// Create a line for `quantity` units of `product`.
    pub fn new(product: &CartProduct, quantity: i64) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
            image: product.image.clone(),
        }
    }

    /// `unit_price * quantity`.
    pub fn line_total(&self) -> Money {
        Money::new(
            self.unit_price.amount_cents.saturating_mul(self.quantity),
            self.unit_price.currency,
        )
    }

    fn refresh_from(&mut self, product: &CartProduct) {
        self.name.clone_from(&product.name);
        self.unit_price = product.unit_price;
        self.image.clone_from(&product.image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> CartProduct {
        CartProduct::new(id, format!("Product {}", id), Money::new(cents, Currency::EUR))
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new(Currency::EUR);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_add_same_item_merges() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", 10), 2).unwrap();
        let qty = cart.add_item(&product("p1", 10), 3).unwrap();

        assert_eq!(qty, 5);
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_reference_scenario() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", 10), 2).unwrap();
        cart.add_item(&product("p1", 10), 3).unwrap();
        cart.add_item(&product("p2", 5), 1).unwrap();

        let lines: Vec<(&str, i64)> = cart
            .items()
            .iter()
            .map(|i| (i.product_id.as_str(), i.quantity))
            .collect();
        assert_eq!(lines, vec![("p1", 5), ("p2", 1)]);
        assert_eq!(cart.total_items(), 6);
        assert_eq!(cart.subtotal().amount_cents, 55);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new(Currency::EUR);
        for id in ["c", "a", "b"] {
            cart.add_item(&product(id, 1), 1).unwrap();
        }
        cart.add_item(&product("a", 1), 1).unwrap();

        let ids: Vec<&str> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_merge_takes_latest_price() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", 10), 1).unwrap();
        cart.add_item(&product("p1", 12), 1).unwrap();

        let line = cart.get_item(&"p1".into()).unwrap();
        assert_eq!(line.unit_price.amount_cents, 12);
        assert_eq!(cart.subtotal().amount_cents, 24);
    }

    #[test]
    fn test_invalid_quantity_is_rejected_without_change() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", 10), 1).unwrap();
        let before = cart.clone();

        assert_eq!(
            cart.add_item(&product("p1", 10), 0),
            Err(CommerceError::InvalidQuantity(0))
        );
        assert_eq!(
            cart.add_item(&product("p2", 10), -4),
            Err(CommerceError::InvalidQuantity(-4))
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::new(Currency::EUR).with_max_quantity(10);
        cart.add_item(&product("p1", 1), 8).unwrap();

        assert_eq!(
            cart.add_item(&product("p1", 1), 3),
            Err(CommerceError::QuantityExceedsLimit(11, 10))
        );
        assert_eq!(cart.total_items(), 8);
    }

    #[test]
    fn test_currency_mismatch() {
        let mut cart = Cart::new(Currency::EUR);
        let usd = CartProduct::new("p1", "Pan", Money::new(100, Currency::USD));
        assert!(matches!(
            cart.add_item(&usd, 1),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtotal_overflow_is_rejected() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", i64::MAX / 2), 1).unwrap();

        assert_eq!(
            cart.add_item(&product("p2", i64::MAX / 2 + 10), 1),
            Err(CommerceError::Overflow)
        );
        assert_eq!(cart.unique_item_count(), 1);
    }

    #[test]
    fn test_item_count_overflow_is_rejected() {
        let mut cart = Cart::new(Currency::EUR).with_max_quantity(i64::MAX);
        cart.add_item(&product("p1", 0), i64::MAX).unwrap();

        assert_eq!(cart.add_item(&product("p2", 0), 1), Err(CommerceError::Overflow));
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.total_items(), i64::MAX);

        cart.set_quantity(&ProductId::new("p1"), 1).unwrap();
        cart.add_item(&product("p2", 0), 1).unwrap();
        assert_eq!(
            cart.set_quantity(&ProductId::new("p1"), i64::MAX),
            Err(CommerceError::Overflow)
        );
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_from_items_rejects_overflowing_count() {
        let lines = vec![
            LineItem::new(&product("p1", 0), i64::MAX),
            LineItem::new(&product("p2", 0), 1),
        ];
        assert_eq!(
            Cart::from_items(Currency::EUR, i64::MAX, lines),
            Err(CommerceError::Overflow)
        );
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", 10), 1).unwrap();
        let id = ProductId::new("p1");

        assert_eq!(
            cart.set_quantity(&id, 5).unwrap(),
            QuantityUpdate::Updated { from: 1, to: 5 }
        );
        assert_eq!(cart.set_quantity(&id, 5).unwrap(), QuantityUpdate::Unchanged);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut a = Cart::new(Currency::EUR);
        a.add_item(&product("p1", 10), 3).unwrap();
        a.add_item(&product("p2", 10), 1).unwrap();
        let mut b = a.clone();
        let id = ProductId::new("p1");

        assert_eq!(a.set_quantity(&id, 0).unwrap(), QuantityUpdate::Removed { from: 3 });
        b.remove_item(&id);
        assert_eq!(a, b);
    }

    #[test]
    fn test_set_quantity_missing_is_noop() {
        let mut cart = Cart::new(Currency::EUR);
        assert_eq!(
            cart.set_quantity(&"ghost".into(), 3).unwrap(),
            QuantityUpdate::Missing
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", 10), 1).unwrap();
        let id = ProductId::new("p1");

        assert!(cart.remove_item(&id).is_some());
        assert!(cart.remove_item(&id).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new(Currency::EUR);
        cart.add_item(&product("p1", 10), 1).unwrap();
        cart.add_item(&product("p2", 10), 1).unwrap();

        assert_eq!(cart.clear(), 2);
        assert_eq!(cart.total_items(), 0);
        assert!(cart.items().is_empty());
        assert_eq!(cart.clear(), 0);
    }

    #[test]
    fn test_from_items_rejects_duplicates() {
        let line = LineItem::new(&product("p1", 10), 1);
        let result = Cart::from_items(Currency::EUR, 99, vec![line.clone(), line]);
        assert_eq!(result, Err(CommerceError::DuplicateItem("p1".to_string())));
    }

    #[test]
    fn test_from_items_rejects_bad_lines() {
        let mut zero = LineItem::new(&product("p1", 10), 1);
        zero.quantity = 0;
        assert_eq!(
            Cart::from_items(Currency::EUR, 99, vec![zero]),
            Err(CommerceError::InvalidQuantity(0))
        );

        let negative = LineItem::new(&product("p1", -10), 1);
        assert!(matches!(
            Cart::from_items(Currency::EUR, 99, vec![negative]),
            Err(CommerceError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_line_total() {
        let line = LineItem::new(&product("p1", 250), 4);
        assert_eq!(line.line_total().amount_cents, 1000);
    }
}
