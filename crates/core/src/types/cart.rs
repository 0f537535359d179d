//! The shopping cart: product lines keyed by product ID.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CurrencyCode, Price, Product, ProductId, Quantity};

/// One product line in the cart.
///
/// Carries the product's display fields alongside the quantity so the cart
/// can be rendered without going back to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: ProductId,
    pub title: String,
    /// Written as a JSON number; strings are accepted when reading.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub image: String,
    pub amount: Quantity,
}

impl CartEntry {
    /// Build a line for `product` holding `amount` units.
    #[must_use]
    pub fn from_product(product: Product, amount: Quantity) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// This line with a different quantity.
    #[must_use]
    pub fn with_amount(self, amount: Quantity) -> Self {
        Self { amount, ..self }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.amount.get())
    }
}

/// The cart contents.
///
/// Lines are keyed by [`ProductId`], so a product appears at most once.
/// Serialized as a JSON array of [`CartEntry`]; when an array holds the same
/// product twice, the later line wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: BTreeMap<ProductId, CartEntry>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.get(&id)
    }

    /// Units of `id` currently in the cart (zero when absent).
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.entries.get(&id).map_or(0, |entry| entry.amount.get())
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines in ascending product ID order.
    pub fn iter(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.values()
    }

    /// Insert or replace the line for `entry.id`, returning the previous line.
    pub fn upsert(&mut self, entry: CartEntry) -> Option<CartEntry> {
        self.entries.insert(entry.id, entry)
    }

    /// Remove the line for `id`, if any.
    pub fn remove(&mut self, id: ProductId) -> Option<CartEntry> {
        self.entries.remove(&id)
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.iter().map(|entry| u64::from(entry.amount.get())).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self, currency_code: CurrencyCode) -> Price {
        let amount = self.iter().map(CartEntry::line_total).sum();
        Price::new(amount, currency_code)
    }
}

impl From<Vec<CartEntry>> for Cart {
    fn from(entries: Vec<CartEntry>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries.into_values().collect()
    }
}

impl FromIterator<CartEntry> for Cart {
    fn from_iter<I: IntoIterator<Item = CartEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|entry| (entry.id, entry)).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(id: i32, amount: i64) -> CartEntry {
        CartEntry {
            id: ProductId::new(id),
            title: format!("Tênis {id}"),
            price: Decimal::new(1799, 1),
            image: format!("https://cdn.example.com/{id}.jpg"),
            amount: Quantity::try_from(amount).unwrap(),
        }
    }

    #[test]
    fn test_upsert_replaces_existing_line() {
        let mut cart = Cart::new();
        assert!(cart.upsert(entry(1, 1)).is_none());
        let previous = cart.upsert(entry(1, 3)).unwrap();

        assert_eq!(previous.amount.get(), 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(ProductId::new(1)), 3);
    }

    #[test]
    fn test_remove_leaves_other_lines() {
        let mut cart: Cart = vec![entry(1, 1), entry(2, 2), entry(3, 3)].into();
        assert!(cart.remove(ProductId::new(2)).is_some());
        assert!(cart.remove(ProductId::new(2)).is_none());

        let ids: Vec<i32> = cart.iter().map(|e| e.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_with_amount_keeps_product_fields() {
        let line = entry(1, 1).with_amount(Quantity::try_from(4_i64).unwrap());

        assert_eq!(line.amount.get(), 4);
        assert_eq!(line.title, "Tênis 1");
        assert_eq!(line.line_total(), Decimal::new(7196, 1));
    }

    #[test]
    fn test_amount_of_absent_product_is_zero() {
        let cart = Cart::new();
        assert_eq!(cart.amount_of(ProductId::new(99)), 0);
        assert!(cart.get(ProductId::new(99)).is_none());
    }

    #[test]
    fn test_totals() {
        let cart: Cart = vec![entry(1, 2), entry(2, 1)].into();
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(
            cart.subtotal(CurrencyCode::BRL).amount,
            Decimal::new(5397, 1)
        );
        assert_eq!(cart.subtotal(CurrencyCode::BRL).to_string(), "R$ 539.70");
    }

    #[test]
    fn test_serializes_as_array() {
        let cart: Cart = vec![entry(2, 1), entry(1, 4)].into();
        let json = serde_json::to_value(&cart).unwrap();

        let lines = json.as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.first().unwrap()["id"], 1);
        assert_eq!(lines.first().unwrap()["amount"], 4);
        assert_eq!(lines.first().unwrap()["price"], 179.9);
    }

    #[test]
    fn test_deserialize_duplicate_ids_keeps_last() {
        let json = r#"[
            {"id": 1, "title": "A", "price": "10", "image": "a.jpg", "amount": 1},
            {"id": 1, "title": "A", "price": "10", "image": "a.jpg", "amount": 5}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(ProductId::new(1)), 5);
    }

    #[test]
    fn test_deserialize_rejects_zero_amount() {
        let json = r#"[{"id": 1, "title": "A", "price": 10, "image": "a.jpg", "amount": 0}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }
}
