//! Order lifecycle store: atomic placement and administrator mutations.

use crate::domain::aggregates::order::{estimated_delivery, OrderDraft, OrderStatus, ShippingStatus};
use crate::error::{Result, StoreError};
use crate::models::{Order, OrderItem};
use crate::sanitize::sanitize_optional;
use crate::store::catalog;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Persists a draft as one transaction: the order row is created at total 0,
/// line items are snapshotted, then the accumulated total is written. A
/// partial order (row without its items) is never observable.
pub async fn place_order(pool: &PgPool, draft: &OrderDraft) -> Result<Order> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, order_number, customer_name, customer_email, customer_phone, \
            customer_company, customer_country, shipping_address, total_amount, status, notes, \
            shipping_cost, is_international, shipping_status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $10, 0, FALSE, $11, NOW(), NOW()) \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&draft.order_number)
    .bind(&draft.customer.name)
    .bind(&draft.customer.email)
    .bind(draft.customer.phone.as_deref())
    .bind(draft.customer.company.as_deref())
    .bind(&draft.customer.country)
    .bind(&draft.customer.shipping_address)
    .bind(OrderStatus::Pending.as_str())
    .bind(draft.customer.notes.as_deref())
    .bind(ShippingStatus::NotShipped.as_str())
    .fetch_one(&mut *tx)
    .await?;

    let mut total = Decimal::ZERO;
    for line in &draft.lines {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, total_price) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(order.id)
        .bind(line.product_id)
        .bind(line.quantity as i32)
        .bind(line.unit_price)
        .bind(line.total_price)
        .execute(&mut *tx)
        .await?;
        total += line.total_price;
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET total_amount = $2 WHERE id = $1 RETURNING *",
    )
    .bind(order.id)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(order_number = %order.order_number, total = %order.total_amount, "order placed");
    Ok(order)
}

pub async fn list_orders(
    pool: &PgPool,
    status: Option<OrderStatus>,
    page: u32,
    per_page: u32,
) -> Result<(Vec<Order>, i64)> {
    let status = status.map(|s| s.as_str());
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(status)
    .bind(per_page as i64)
    .bind(catalog::page_offset(page, per_page))
    .fetch_all(pool)
    .await?;
    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1)")
            .bind(status)
            .fetch_one(pool)
            .await?;
    Ok((orders, total.0))
}

pub async fn get_order(pool: &PgPool, id: Uuid) -> Result<(Order, Vec<OrderItem>)> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("order"))?;
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok((order, items))
}

#[derive(Debug)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub admin_notes: Option<String>,
    pub shipping_service: Option<String>,
    pub tracking_number: Option<String>,
    pub shipping_cost: Decimal,
    pub is_international: bool,
    /// `None` keeps the current shipping status.
    pub shipping_status: Option<ShippingStatus>,
}

/// Applies an administrator edit atomically. Derived fields:
/// `shipping_date` is stamped the first time the order moves to shipped, and
/// `estimated_delivery` is computed once when a shipping date exists and no
/// estimate has been set. Later shipping-date edits do not recompute it.
pub async fn update_order(pool: &PgPool, id: Uuid, update: OrderUpdate) -> Result<Order> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("order"))?;

    let current_status = parse_status(&current.status)?;
    if !current_status.accepts(update.status) {
        return Err(StoreError::Validation(format!(
            "order status cannot change from {} to {}",
            current_status, update.status
        )));
    }
    let current_shipping = parse_shipping_status(&current.shipping_status)?;
    let next_shipping = update.shipping_status.unwrap_or(current_shipping);
    if !current_shipping.accepts(next_shipping) {
        return Err(StoreError::Validation(format!(
            "shipping status cannot change from {} to {}",
            current_shipping, next_shipping
        )));
    }
    if update.shipping_cost < Decimal::ZERO {
        return Err(StoreError::Validation("shipping_cost must be >= 0".into()));
    }

    let mut shipping_date = current.shipping_date;
    if update.status == OrderStatus::Shipped && shipping_date.is_none() {
        shipping_date = Some(Utc::now());
    }
    let mut estimate = current.estimated_delivery;
    if let (Some(date), None) = (shipping_date, estimate) {
        estimate = Some(estimated_delivery(date, update.is_international));
    }

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, admin_notes = $3, shipping_service = $4, \
            tracking_number = $5, shipping_cost = $6, is_international = $7, \
            shipping_status = $8, shipping_date = $9, estimated_delivery = $10, \
            updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(update.status.as_str())
    .bind(sanitize_optional(update.admin_notes.as_deref()))
    .bind(sanitize_optional(update.shipping_service.as_deref()))
    .bind(sanitize_optional(update.tracking_number.as_deref()))
    .bind(update.shipping_cost)
    .bind(update.is_international)
    .bind(next_shipping.as_str())
    .bind(shipping_date)
    .bind(estimate)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(order)
}

#[derive(Debug)]
pub struct TrackingUpdate {
    pub tracking_number: Option<String>,
    pub shipping_service: Option<String>,
    pub shipping_status: Option<ShippingStatus>,
}

/// Narrow mutation for the tracking form; does not touch the fulfillment
/// status or derived dates.
pub async fn update_tracking(pool: &PgPool, id: Uuid, update: TrackingUpdate) -> Result<Order> {
    let current = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("order"))?;
    let current_shipping = parse_shipping_status(&current.shipping_status)?;
    let next_shipping = update.shipping_status.unwrap_or(current_shipping);
    if !current_shipping.accepts(next_shipping) {
        return Err(StoreError::Validation(format!(
            "shipping status cannot change from {} to {}",
            current_shipping, next_shipping
        )));
    }
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET tracking_number = $2, shipping_service = $3, shipping_status = $4, \
            updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(sanitize_optional(update.tracking_number.as_deref()))
    .bind(sanitize_optional(update.shipping_service.as_deref()))
    .bind(next_shipping.as_str())
    .fetch_one(pool)
    .await?;
    Ok(order)
}

#[derive(Debug, Default)]
pub struct ShippingFilter {
    pub shipping_status: Option<ShippingStatus>,
    pub international: Option<bool>,
    pub page: u32,
    pub per_page: u32,
}

/// Shipping page: orders already shipped or delivered, newest shipping date
/// first with undated ones last.
pub async fn shipping_list(pool: &PgPool, filter: &ShippingFilter) -> Result<(Vec<Order>, i64)> {
    let status = filter.shipping_status.map(|s| s.as_str());
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders \
         WHERE status IN ('shipped', 'delivered') \
           AND ($1::text IS NULL OR shipping_status = $1) \
           AND ($2::boolean IS NULL OR is_international = $2) \
         ORDER BY shipping_date DESC NULLS LAST LIMIT $3 OFFSET $4",
    )
    .bind(status)
    .bind(filter.international)
    .bind(filter.per_page as i64)
    .bind(catalog::page_offset(filter.page, filter.per_page))
    .fetch_all(pool)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders \
         WHERE status IN ('shipped', 'delivered') \
           AND ($1::text IS NULL OR shipping_status = $1) \
           AND ($2::boolean IS NULL OR is_international = $2)",
    )
    .bind(status)
    .bind(filter.international)
    .fetch_one(pool)
    .await?;
    Ok((orders, total.0))
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub confirmed_revenue: Decimal,
    pub recent_orders: Vec<Order>,
}

pub async fn dashboard(pool: &PgPool) -> Result<DashboardStats> {
    let total_products: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    let total_orders: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    let pending_orders: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status = 'pending'")
            .fetch_one(pool)
            .await?;
    let confirmed_revenue: (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE status = 'confirmed'",
    )
    .fetch_one(pool)
    .await?;
    let recent_orders =
        sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC LIMIT 5")
            .fetch_all(pool)
            .await?;
    Ok(DashboardStats {
        total_products: total_products.0,
        total_orders: total_orders.0,
        pending_orders: pending_orders.0,
        confirmed_revenue: confirmed_revenue.0,
        recent_orders,
    })
}

fn parse_status(value: &str) -> Result<OrderStatus> {
    OrderStatus::parse(value).ok_or_else(|| {
        StoreError::Validation(format!("order has unrecognized status '{value}'"))
    })
}

fn parse_shipping_status(value: &str) -> Result<ShippingStatus> {
    ShippingStatus::parse(value).ok_or_else(|| {
        StoreError::Validation(format!("order has unrecognized shipping status '{value}'"))
    })
}
