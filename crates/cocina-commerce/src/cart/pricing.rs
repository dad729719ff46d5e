//! Cart aggregates.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Derived totals for a cart, always computed from its line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of quantities.
    pub total_items: i64,
    /// Number of distinct lines.
    pub unique_items: usize,
    /// Sum of line totals.
    pub subtotal: Money,
}

impl CartTotals {
    /// Check if the totals describe an empty cart.
    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_totals_not_empty() {
        let totals = CartTotals {
            total_items: 6,
            unique_items: 2,
            subtotal: Money::new(55, Currency::EUR),
        };
        assert!(!totals.is_empty());
    }

    #[test]
    fn test_empty_totals() {
        let totals = CartTotals {
            total_items: 0,
            unique_items: 0,
            subtotal: Money::zero(Currency::EUR),
        };
        assert!(totals.is_empty());
    }
}
