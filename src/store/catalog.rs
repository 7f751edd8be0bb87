//! Catalog store: categories and products with bilingual text and
//! dual-currency prices.

use crate::error::{Result, StoreError};
use crate::models::{Category, Product};
use crate::sanitize::{sanitize_optional, sanitize_required};
use crate::store::settings;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub fn normalize_page(page: Option<u32>, per_page: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, per_page)
}

/// OFFSET for a 1-based page. Widened before multiplying so an arbitrary
/// `page` query value cannot overflow.
pub fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(per_page)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
}

pub async fn list_categories(
    pool: &PgPool,
    search: Option<&str>,
    page: u32,
    per_page: u32,
) -> Result<(Vec<Category>, i64)> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories \
         WHERE ($1::text IS NULL OR name_en ILIKE '%' || $1 || '%' OR name_id ILIKE '%' || $1 || '%') \
         ORDER BY name_en LIMIT $2 OFFSET $3",
    )
    .bind(search)
    .bind(per_page as i64)
    .bind(page_offset(page, per_page))
    .fetch_all(pool)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM categories \
         WHERE ($1::text IS NULL OR name_en ILIKE '%' || $1 || '%' OR name_id ILIKE '%' || $1 || '%')",
    )
    .bind(search)
    .fetch_one(pool)
    .await?;
    Ok((categories, total.0))
}

pub async fn get_category(pool: &PgPool, id: Uuid) -> Result<Category> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("category"))
}

pub async fn create_category(pool: &PgPool, input: CategoryInput) -> Result<Category> {
    let (name_en, name_id, description_en, description_id) = sanitize_category(input)?;
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name_en, name_id, description_en, description_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(name_en)
    .bind(name_id)
    .bind(description_en)
    .bind(description_id)
    .fetch_one(pool)
    .await?;
    Ok(category)
}

pub async fn update_category(pool: &PgPool, id: Uuid, input: CategoryInput) -> Result<Category> {
    let (name_en, name_id, description_en, description_id) = sanitize_category(input)?;
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET name_en = $2, name_id = $3, description_en = $4, description_id = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name_en)
    .bind(name_id)
    .bind(description_en)
    .bind(description_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("category"))
}

/// Deleting a category that still owns products is a conflict, not a fatal
/// error; category and products are left untouched.
pub async fn delete_category(pool: &PgPool, id: Uuid) -> Result<()> {
    let owned: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if owned.0 > 0 {
        return Err(StoreError::Conflict(format!(
            "category still owns {} product(s)",
            owned.0
        )));
    }
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("category"));
    }
    Ok(())
}

fn sanitize_category(
    input: CategoryInput,
) -> Result<(String, String, Option<String>, Option<String>)> {
    Ok((
        sanitize_required("name_en", &input.name_en)?,
        sanitize_required("name_id", &input.name_id)?,
        sanitize_optional(input.description_en.as_deref()),
        sanitize_optional(input.description_id.as_deref()),
    ))
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub only_available: bool,
    pub page: u32,
    pub per_page: u32,
}

pub async fn list_products(pool: &PgPool, filter: &ProductFilter) -> Result<(Vec<Product>, i64)> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products \
         WHERE ($1::text IS NULL OR name_en ILIKE '%' || $1 || '%' OR name_id ILIKE '%' || $1 || '%') \
           AND ($2::uuid IS NULL OR category_id = $2) \
           AND (NOT $3 OR is_available) \
         ORDER BY created_at DESC LIMIT $4 OFFSET $5",
    )
    .bind(filter.search.as_deref())
    .bind(filter.category_id)
    .bind(filter.only_available)
    .bind(filter.per_page as i64)
    .bind(page_offset(filter.page, filter.per_page))
    .fetch_all(pool)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products \
         WHERE ($1::text IS NULL OR name_en ILIKE '%' || $1 || '%' OR name_id ILIKE '%' || $1 || '%') \
           AND ($2::uuid IS NULL OR category_id = $2) \
           AND (NOT $3 OR is_available)",
    )
    .bind(filter.search.as_deref())
    .bind(filter.category_id)
    .bind(filter.only_available)
    .fetch_one(pool)
    .await?;
    Ok((products, total.0))
}

pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Product> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("product"))
}

pub async fn featured_products(pool: &PgPool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE is_available ORDER BY created_at DESC LIMIT 6",
    )
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn related_products(pool: &PgPool, product: &Product) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products \
         WHERE category_id = $1 AND is_available AND id <> $2 \
         ORDER BY created_at DESC LIMIT 4",
    )
    .bind(product.category_id)
    .bind(product.id)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

/// Bulk fetch for cart snapshot resolution.
pub async fn products_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Product>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(products)
}

#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub price_usd: Decimal,
    /// When omitted, derived from `price_usd` at the configured exchange
    /// rate. The two prices stay independently settable otherwise.
    pub price_idr: Option<Decimal>,
    pub category_id: Uuid,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_min_order")]
    pub min_order_quantity: i32,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_min_order() -> i32 {
    1
}

fn default_unit() -> String {
    "kg".to_string()
}

fn default_true() -> bool {
    true
}

struct ValidatedProduct {
    name_en: String,
    name_id: String,
    description_en: Option<String>,
    description_id: Option<String>,
    price_usd: Decimal,
    price_idr: Decimal,
    category_id: Uuid,
    stock_quantity: i32,
    min_order_quantity: i32,
    unit: String,
    image_url: Option<String>,
    is_available: bool,
}

async fn validate_product(pool: &PgPool, input: ProductInput) -> Result<ValidatedProduct> {
    if input.price_usd < Decimal::ZERO {
        return Err(StoreError::Validation("price_usd must be >= 0".into()));
    }
    if matches!(input.price_idr, Some(p) if p < Decimal::ZERO) {
        return Err(StoreError::Validation("price_idr must be >= 0".into()));
    }
    if input.stock_quantity < 0 {
        return Err(StoreError::Validation("stock_quantity must be >= 0".into()));
    }
    if input.min_order_quantity < 1 {
        return Err(StoreError::Validation(
            "min_order_quantity must be >= 1".into(),
        ));
    }
    // category must exist before the product can reference it
    get_category(pool, input.category_id).await?;

    let price_idr = match input.price_idr {
        Some(p) => p,
        None => {
            let rate = settings::get(pool).await?.exchange_rate;
            (input.price_usd * rate).round_dp(2)
        }
    };

    Ok(ValidatedProduct {
        name_en: sanitize_required("name_en", &input.name_en)?,
        name_id: sanitize_required("name_id", &input.name_id)?,
        description_en: sanitize_optional(input.description_en.as_deref()),
        description_id: sanitize_optional(input.description_id.as_deref()),
        price_usd: input.price_usd,
        price_idr,
        category_id: input.category_id,
        stock_quantity: input.stock_quantity,
        min_order_quantity: input.min_order_quantity,
        unit: sanitize_required("unit", &input.unit)?,
        image_url: input.image_url,
        is_available: input.is_available,
    })
}

pub async fn create_product(pool: &PgPool, input: ProductInput) -> Result<Product> {
    let v = validate_product(pool, input).await?;
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name_en, name_id, description_en, description_id, price_usd, \
            price_idr, category_id, stock_quantity, min_order_quantity, unit, image_url, \
            is_available, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(v.name_en)
    .bind(v.name_id)
    .bind(v.description_en)
    .bind(v.description_id)
    .bind(v.price_usd)
    .bind(v.price_idr)
    .bind(v.category_id)
    .bind(v.stock_quantity)
    .bind(v.min_order_quantity)
    .bind(v.unit)
    .bind(v.image_url)
    .bind(v.is_available)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

pub async fn update_product(pool: &PgPool, id: Uuid, input: ProductInput) -> Result<Product> {
    let v = validate_product(pool, input).await?;
    sqlx::query_as::<_, Product>(
        "UPDATE products SET name_en = $2, name_id = $3, description_en = $4, \
            description_id = $5, price_usd = $6, price_idr = $7, category_id = $8, \
            stock_quantity = $9, min_order_quantity = $10, unit = $11, image_url = $12, \
            is_available = $13, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(v.name_en)
    .bind(v.name_id)
    .bind(v.description_en)
    .bind(v.description_id)
    .bind(v.price_usd)
    .bind(v.price_idr)
    .bind(v.category_id)
    .bind(v.stock_quantity)
    .bind(v.min_order_quantity)
    .bind(v.unit)
    .bind(v.image_url)
    .bind(v.is_available)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("product"))
}

/// Unconditional delete. Order items keep their snapshotted prices and are
/// unaffected.
pub async fn delete_product(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("product"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(normalize_page(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(normalize_page(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize_page(Some(3), Some(500)), (3, MAX_PAGE_SIZE));
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(0, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn offset_survives_extreme_pages() {
        // page is user-supplied and unclamped; the widened multiply must not
        // overflow or wrap.
        assert_eq!(
            page_offset(u32::MAX, MAX_PAGE_SIZE),
            (i64::from(u32::MAX) - 1) * i64::from(MAX_PAGE_SIZE)
        );
        assert!(page_offset(u32::MAX, MAX_PAGE_SIZE) > 0);
    }
}
