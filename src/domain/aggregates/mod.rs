//! Aggregates module
pub mod cart;
pub mod order;

pub use cart::{Cart, CartEntry, CartLine};
pub use order::{CustomerInfo, OrderDraft, OrderStatus, ShippingStatus};
