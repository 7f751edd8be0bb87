//! Session cart aggregate.
//!
//! A cart is a transient mapping from product id to requested quantity. It
//! lives only inside a session and is discarded on checkout or expiry.

use crate::domain::value_objects::{Currency, Money};
use crate::models::Product;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// One resolved cart line: the product row plus the price snapshot for the
/// chosen currency.
#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn product_ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|e| e.product_id).collect()
    }

    /// Increments an existing entry or inserts a new one.
    pub fn add(&mut self, product_id: Uuid, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.entries.iter_mut().find(|e| e.product_id == product_id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(CartEntry { product_id, quantity }),
        }
    }

    /// Sets the quantity outright; zero removes the entry.
    pub fn update(&mut self, product_id: Uuid, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        match self.entries.iter_mut().find(|e| e.product_id == product_id) {
            Some(entry) => entry.quantity = quantity,
            None => self.entries.push(CartEntry { product_id, quantity }),
        }
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.entries.retain(|e| e.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Resolves entries against catalog rows in insertion order. Entries whose
    /// product is missing or unavailable are silently dropped; they never
    /// block checkout.
    pub fn snapshot(&self, catalog: &[Product], currency: Currency) -> Vec<CartLine> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let product = catalog
                    .iter()
                    .find(|p| p.id == entry.product_id && p.is_available)?;
                let unit_price = Money::new(product.price_in(currency), currency);
                Some(CartLine {
                    product: product.clone(),
                    quantity: entry.quantity,
                    unit_price,
                    line_total: unit_price.multiply(entry.quantity),
                })
            })
            .collect()
    }
}

/// Sum of line totals for a snapshot.
pub fn snapshot_total(lines: &[CartLine], currency: Currency) -> Money {
    lines.iter().fold(Money::zero(currency), |acc, line| {
        acc.add(&line.line_total).unwrap_or(acc)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn product(id: Uuid, usd: i64, idr: i64, available: bool) -> Product {
        let now = Utc::now();
        Product {
            id,
            name_en: "Cavendish Banana".into(),
            name_id: "Pisang Cavendish".into(),
            description_en: None,
            description_id: None,
            price_usd: Decimal::from(usd),
            price_idr: Decimal::from(idr),
            category_id: Uuid::new_v4(),
            stock_quantity: 100,
            min_order_quantity: 1,
            unit: "kg".into(),
            image_url: None,
            is_available: available,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_merges_quantities() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(id, 2);
        cart.add(id, 3);
        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.entries()[0].quantity, 5);
    }

    #[test]
    fn test_update_to_zero_removes() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(id, 2);
        cart.update(id, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_snapshot_drops_missing_and_unavailable() {
        let good = product(Uuid::new_v4(), 10, 150_000, true);
        let gone = product(Uuid::new_v4(), 5, 75_000, false);
        let mut cart = Cart::new();
        cart.add(good.id, 2);
        cart.add(gone.id, 1);
        cart.add(Uuid::new_v4(), 4); // deleted product, not in catalog

        let lines = cart.snapshot(&[good.clone(), gone], Currency::Usd);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.id, good.id);
        assert_eq!(lines[0].line_total.amount(), Decimal::from(20));
    }

    #[test]
    fn test_snapshot_totals_per_currency() {
        let a = product(Uuid::new_v4(), 10, 150_000, true);
        let b = product(Uuid::new_v4(), 5, 75_000, true);
        let mut cart = Cart::new();
        cart.add(a.id, 2);
        cart.add(b.id, 1);

        let catalog = vec![a, b];
        let usd = cart.snapshot(&catalog, Currency::Usd);
        assert_eq!(
            snapshot_total(&usd, Currency::Usd).amount(),
            Decimal::from(25)
        );
        let idr = cart.snapshot(&catalog, Currency::Idr);
        assert_eq!(
            snapshot_total(&idr, Currency::Idr).amount(),
            Decimal::from(375_000)
        );
    }
}
