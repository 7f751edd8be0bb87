//! AgriExport - Bilingual Agricultural-Export Storefront
//!
//! English/Indonesian storefront with an admin back office.
//!
//! ## Features
//! - Product/category catalog with bilingual text and dual-currency prices
//! - Locale-aware pricing and currency formatting
//! - Session-based shopping cart and atomic order placement
//! - Order fulfillment and shipping-status tracking
//! - Company settings, appearance/theme and gallery management

pub mod domain;
pub mod error;
pub mod handlers;
pub mod locale;
pub mod media;
pub mod models;
pub mod sanitize;
pub mod session;
pub mod store;

pub use domain::aggregates::{Cart, CustomerInfo, OrderDraft, OrderStatus, ShippingStatus};
pub use domain::value_objects::{format_amount, Currency, Language, Money};
pub use error::{Result, StoreError};
pub use handlers::{router, AppState};
pub use locale::LocalePreference;
pub use media::FileStore;
pub use session::SessionStore;
