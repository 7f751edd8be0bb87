//! Order lifecycle: status state machines, order-number allocation, delivery
//! estimation and the draft built from a cart snapshot.

use crate::domain::aggregates::cart::CartLine;
use crate::domain::value_objects::Currency;
use crate::error::StoreError;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order numbers: prefix + YYYYMMDD + 8 uppercase hex characters. Collisions
/// are treated as negligible at this scale and not actively checked.
pub const ORDER_NUMBER_PREFIX: &str = "BLE";

pub fn allocate_order_number(now: DateTime<Utc>) -> String {
    format!(
        "{}{}{:08X}",
        ORDER_NUMBER_PREFIX,
        now.format("%Y%m%d"),
        rand::random::<u32>()
    )
}

/// Fulfillment lifecycle. `Cancelled` is terminal and reachable from any
/// non-terminal state; the rest only move forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Same-state updates are accepted as no-ops so an admin form resubmission
    /// does not fail.
    pub fn accepts(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if *self == next {
            return true;
        }
        match (self, next) {
            (Pending, Confirmed) | (Confirmed, Shipped) | (Shipped, Delivered) => true,
            (from, Cancelled) if !from.is_terminal() => true,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shipment progress, tracked independently of the fulfillment status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    #[default]
    NotShipped,
    InTransit,
    OutForDelivery,
    Delivered,
}

impl ShippingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingStatus::NotShipped => "not_shipped",
            ShippingStatus::InTransit => "in_transit",
            ShippingStatus::OutForDelivery => "out_for_delivery",
            ShippingStatus::Delivered => "delivered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "not_shipped" => Some(ShippingStatus::NotShipped),
            "in_transit" => Some(ShippingStatus::InTransit),
            "out_for_delivery" => Some(ShippingStatus::OutForDelivery),
            "delivered" => Some(ShippingStatus::Delivered),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ShippingStatus::NotShipped => 0,
            ShippingStatus::InTransit => 1,
            ShippingStatus::OutForDelivery => 2,
            ShippingStatus::Delivered => 3,
        }
    }

    /// Shipment progress never moves backwards; intermediate stages may be
    /// skipped when a carrier only reports the final scan.
    pub fn accepts(&self, next: ShippingStatus) -> bool {
        next.rank() >= self.rank()
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// International shipments are estimated at 10 days, domestic at 2.
pub fn estimated_delivery(shipping_date: DateTime<Utc>, is_international: bool) -> DateTime<Utc> {
    let days = if is_international { 10 } else { 2 };
    shipping_date + Duration::days(days)
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub country: String,
    pub shipping_address: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DraftLine {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Everything needed to persist an order atomically. Built up front so an
/// empty snapshot is rejected before any row is written.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub order_number: String,
    pub customer: CustomerInfo,
    pub currency: Currency,
    pub lines: Vec<DraftLine>,
    pub total_amount: Decimal,
}

impl OrderDraft {
    pub fn from_snapshot(
        lines: &[CartLine],
        customer: CustomerInfo,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        let lines: Vec<DraftLine> = lines
            .iter()
            .map(|line| DraftLine {
                product_id: line.product.id,
                quantity: line.quantity,
                unit_price: line.unit_price.amount(),
                total_price: line.line_total.amount(),
            })
            .collect();
        let total_amount = lines.iter().map(|l| l.total_price).sum();
        Ok(Self {
            order_number: allocate_order_number(now),
            customer,
            currency,
            lines,
            total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::Cart;
    use crate::models::Product;
    use std::collections::HashSet;

    fn product(usd: i64, idr: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name_en: "Robusta Coffee".into(),
            name_id: "Kopi Robusta".into(),
            description_en: None,
            description_id: None,
            price_usd: Decimal::from(usd),
            price_idr: Decimal::from(idr),
            category_id: Uuid::new_v4(),
            stock_quantity: 50,
            min_order_quantity: 1,
            unit: "kg".into(),
            image_url: None,
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Siti Rahayu".into(),
            email: "siti@example.com".into(),
            phone: None,
            company: None,
            country: "Indonesia".into(),
            shipping_address: "Jl. Merdeka 1, Bandung".into(),
            notes: None,
        }
    }

    #[test]
    fn test_order_number_shape() {
        let now = "2024-03-05T10:00:00Z".parse().unwrap();
        let number = allocate_order_number(now);
        assert!(number.starts_with("BLE20240305"));
        assert_eq!(number.len(), 3 + 8 + 8);
        assert!(number[11..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(number, number.to_uppercase());
    }

    #[test]
    fn test_order_numbers_distinct() {
        let now = Utc::now();
        let numbers: HashSet<String> = (0..1000).map(|_| allocate_order_number(now)).collect();
        assert_eq!(numbers.len(), 1000);
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;
        assert!(Pending.accepts(Confirmed));
        assert!(Confirmed.accepts(Shipped));
        assert!(Shipped.accepts(Delivered));
        assert!(Pending.accepts(Cancelled));
        assert!(Shipped.accepts(Cancelled));
        // no-op resubmission
        assert!(Confirmed.accepts(Confirmed));
        // rejected
        assert!(!Pending.accepts(Shipped));
        assert!(!Shipped.accepts(Confirmed));
        assert!(!Delivered.accepts(Cancelled));
        assert!(!Cancelled.accepts(Pending));
    }

    #[test]
    fn test_shipping_status_never_regresses() {
        use ShippingStatus::*;
        assert!(NotShipped.accepts(InTransit));
        assert!(NotShipped.accepts(Delivered));
        assert!(InTransit.accepts(InTransit));
        assert!(!Delivered.accepts(OutForDelivery));
        assert!(!OutForDelivery.accepts(NotShipped));
    }

    #[test]
    fn test_estimated_delivery_offsets() {
        let shipped: DateTime<Utc> = "2024-06-01T08:30:00Z".parse().unwrap();
        assert_eq!(
            estimated_delivery(shipped, true),
            "2024-06-11T08:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(
            estimated_delivery(shipped, false),
            "2024-06-03T08:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_draft_from_empty_snapshot_fails() {
        let err = OrderDraft::from_snapshot(&[], customer(), Currency::Usd, Utc::now());
        assert!(matches!(err, Err(StoreError::EmptyCart)));
    }

    #[test]
    fn test_draft_totals_match_line_sums() {
        let a = product(10, 150_000);
        let b = product(5, 75_000);
        let mut cart = Cart::new();
        cart.add(a.id, 2);
        cart.add(b.id, 1);
        let lines = cart.snapshot(&[a.clone(), b.clone()], Currency::Usd);

        let draft =
            OrderDraft::from_snapshot(&lines, customer(), Currency::Usd, Utc::now()).unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].unit_price, Decimal::from(10));
        assert_eq!(draft.lines[0].total_price, Decimal::from(20));
        assert_eq!(draft.lines[1].unit_price, Decimal::from(5));
        assert_eq!(draft.lines[1].total_price, Decimal::from(5));
        assert_eq!(draft.total_amount, Decimal::from(25));
        assert_eq!(
            draft.total_amount,
            draft.lines.iter().map(|l| l.total_price).sum()
        );
    }
}
