//! Persistence rows for the catalog, orders and settings tables.

use crate::domain::value_objects::{Currency, Language};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name_en,
            Language::Id => &self.name_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub price_usd: Decimal,
    pub price_idr: Decimal,
    pub category_id: Uuid,
    pub stock_quantity: i32,
    pub min_order_quantity: i32,
    pub unit: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Stored price matching the display currency. No conversion happens at
    /// read time; both fields are maintained at write time.
    pub fn price_in(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Usd => self.price_usd,
            Currency::Idr => self.price_idr,
        }
    }

    pub fn name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name_en,
            Language::Id => &self.name_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_company: Option<String>,
    pub customer_country: String,
    pub shipping_address: String,
    pub total_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    pub shipping_service: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_date: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub shipping_cost: Decimal,
    pub is_international: bool,
    pub shipping_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item snapshotted at order time; immutable even if the product is
/// later edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Singleton configuration row (id is always 1).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanySettings {
    pub id: i16,
    pub company_name_en: String,
    pub company_name_id: String,
    pub company_description_en: String,
    pub company_description_id: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_whatsapp: String,
    pub address_en: String,
    pub address_id: String,
    pub exchange_rate: Decimal,
    pub default_currency: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_url: Option<String>,
    pub copyright_text: String,
    pub layout_type: String,
    pub gallery_images: String,
    pub gallery_mode: String,
    pub selected_theme: String,
    pub custom_primary_color: String,
    pub custom_secondary_color: String,
    pub custom_accent_color: String,
    pub theme_mode: String,
    pub updated_at: DateTime<Utc>,
}

impl CompanySettings {
    /// Gallery images are stored as a comma-joined list.
    pub fn gallery(&self) -> Vec<&str> {
        self.gallery_images
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}
