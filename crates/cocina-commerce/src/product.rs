//! Product input records.
//!
//! Products arrive already shaped by the catalog collaborator. The cart reads
//! four fields (id, name, price, image) and treats everything else as opaque.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The part of a product the cart needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Product identifier; merge key in the cart.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Image reference (URL or asset path).
    pub image: Option<String>,
}

impl CartProduct {
    /// Create a product without an image.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            image: None,
        }
    }

    /// Attach an image reference. Blank references are ignored.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        let image = image.into();
        self.image = if image.trim().is_empty() {
            None
        } else {
            Some(image)
        };
        self
    }

    /// Check the fields the cart relies on.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.id.is_blank() {
            return Err(CommerceError::MissingField("id"));
        }
        if self.name.trim().is_empty() {
            return Err(CommerceError::MissingField("name"));
        }
        if self.unit_price.is_negative() {
            return Err(CommerceError::InvalidPrice(
                self.unit_price.display_amount(),
            ));
        }
        Ok(())
    }

    /// Build a product from a catalog record.
    ///
    /// Reads `id` (string or integer), `name` (or `title`), a price and an
    /// optional `image`. The price is taken from `price_cents` (integer minor
    /// units) when present, otherwise from `price` in major units, given as
    /// a number or a numeric string.
    ///
    /// ```
    /// use cocina_commerce::money::Currency;
    /// use cocina_commerce::product::CartProduct;
    ///
    /// let record = serde_json::json!({
    ///     "id": "knife-01",
    ///     "title": "Chef Knife",
    ///     "price": "24.50",
    ///     "image": "/img/knife.jpg",
    ///     "collection_id": "knives"
    /// });
    /// let product = CartProduct::from_record(&record, Currency::EUR).unwrap();
    /// assert_eq!(product.name, "Chef Knife");
    /// assert_eq!(product.unit_price.amount_cents, 2450);
    /// ```
    pub fn from_record(record: &Value, currency: Currency) -> Result<Self, CommerceError> {
        let id = match record.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) if n.is_u64() || n.is_i64() => n.to_string(),
            _ => return Err(CommerceError::MissingField("id")),
        };

        let name = record
            .get("name")
            .or_else(|| record.get("title"))
            .and_then(Value::as_str)
            .ok_or(CommerceError::MissingField("name"))?;

        let unit_price = parse_price(record, currency)?;

        let mut product = Self::new(id, name, unit_price);
        if let Some(image) = record.get("image").and_then(Value::as_str) {
            product = product.with_image(image);
        }
        product.validate()?;
        Ok(product)
    }
}

fn parse_price(record: &Value, currency: Currency) -> Result<Money, CommerceError> {
    if let Some(cents) = record.get("price_cents").filter(|v| !v.is_null()) {
        return cents
            .as_i64()
            .map(|c| Money::new(c, currency))
            .ok_or_else(|| CommerceError::InvalidPrice(cents.to_string()));
    }

    let raw = match record.get("price") {
        None | Some(Value::Null) => return Err(CommerceError::MissingField("price")),
        Some(raw) => raw,
    };

    let amount = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    amount
        .and_then(|a| Money::from_decimal(a, currency))
        .ok_or_else(|| CommerceError::InvalidPrice(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_ok() {
        let product = CartProduct::new("p1", "Sartén", Money::new(1999, Currency::EUR));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_fields() {
        let no_id = CartProduct::new("", "Sartén", Money::new(1, Currency::EUR));
        assert_eq!(no_id.validate(), Err(CommerceError::MissingField("id")));

        let no_name = CartProduct::new("p1", "   ", Money::new(1, Currency::EUR));
        assert_eq!(no_name.validate(), Err(CommerceError::MissingField("name")));
    }

    #[test]
    fn test_validate_negative_price() {
        let product = CartProduct::new("p1", "Sartén", Money::new(-1, Currency::EUR));
        assert!(matches!(
            product.validate(),
            Err(CommerceError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_free_product_is_valid() {
        let product = CartProduct::new("gift", "Recetario", Money::zero(Currency::EUR));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_blank_image_is_none() {
        let product = CartProduct::new("p1", "Olla", Money::new(1, Currency::EUR)).with_image("");
        assert!(product.image.is_none());
    }

    #[test]
    fn test_from_record_numeric_price() {
        let record = json!({ "id": 42, "name": "Olla", "price": 35.9 });
        let product = CartProduct::from_record(&record, Currency::EUR).unwrap();
        assert_eq!(product.id.as_str(), "42");
        assert_eq!(product.unit_price.amount_cents, 3590);
        assert!(product.image.is_none());
    }

    #[test]
    fn test_from_record_price_cents_wins() {
        let record = json!({ "id": "p1", "name": "Olla", "price": 99.0, "price_cents": 1250 });
        let product = CartProduct::from_record(&record, Currency::EUR).unwrap();
        assert_eq!(product.unit_price.amount_cents, 1250);
    }

    #[test]
    fn test_from_record_rejects_non_numeric_price() {
        let record = json!({ "id": "p1", "name": "Olla", "price": "gratis" });
        assert!(matches!(
            CartProduct::from_record(&record, Currency::EUR),
            Err(CommerceError::InvalidPrice(_))
        ));

        let record = json!({ "id": "p1", "name": "Olla", "price": "NaN" });
        assert!(matches!(
            CartProduct::from_record(&record, Currency::EUR),
            Err(CommerceError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_from_record_missing_fields() {
        let record = json!({ "name": "Olla", "price": 1 });
        assert_eq!(
            CartProduct::from_record(&record, Currency::EUR),
            Err(CommerceError::MissingField("id"))
        );

        let record = json!({ "id": "p1", "price": 1 });
        assert_eq!(
            CartProduct::from_record(&record, Currency::EUR),
            Err(CommerceError::MissingField("name"))
        );

        let record = json!({ "id": "p1", "name": "Olla" });
        assert_eq!(
            CartProduct::from_record(&record, Currency::EUR),
            Err(CommerceError::MissingField("price"))
        );
    }

    #[test]
    fn test_from_record_negative_price() {
        let record = json!({ "id": "p1", "name": "Olla", "price": -3 });
        assert!(matches!(
            CartProduct::from_record(&record, Currency::EUR),
            Err(CommerceError::InvalidPrice(_))
        ));
    }
}
