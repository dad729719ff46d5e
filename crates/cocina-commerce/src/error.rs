//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in cart operations.
///
/// Every variant describes malformed input. Cart contents alone never make an
/// operation fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Quantity is zero or negative where a positive one is required.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Price is negative or not a number.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// A required product field is absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The same product appears twice in a restored cart.
    #[error("Duplicate line item: {0}")]
    DuplicateItem(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// A quantity or money total does not fit in an `i64`.
    #[error("Arithmetic overflow in cart totals")]
    Overflow,

    /// Persistence could not be set up.
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl CommerceError {
    /// Whether the error was caused by caller input rather than the environment.
    ///
    /// Overflow counts as input: it comes from a quantity or price too large
    /// for the cart to hold.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, CommerceError::StorageError(_))
    }
}

#[cfg(feature = "storage")]
impl From<cocina_cache::CacheError> for CommerceError {
    fn from(e: cocina_cache::CacheError) -> Self {
        CommerceError::StorageError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(CommerceError::InvalidQuantity(0).is_invalid_input());
        assert!(CommerceError::Overflow.is_invalid_input());
        assert!(!CommerceError::StorageError("disk full".to_string()).is_invalid_input());
    }
}
