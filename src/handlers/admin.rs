//! Admin endpoints: catalog CRUD, order management, shipping, settings.
//!
//! Authentication is owned by the hosting layer fronting these routes; the
//! handlers only validate and apply the mutations.

use crate::domain::aggregates::order::{OrderStatus, ShippingStatus};
use crate::error::{Result, StoreError};
use crate::handlers::{AppState, PaginatedResponse};
use crate::models::{Category, CompanySettings, Order, OrderItem, Product};
use crate::store::catalog::{self, CategoryInput, ProductInput};
use crate::store::orders::{self, DashboardStats, OrderUpdate, ShippingFilter, TrackingUpdate};
use crate::store::settings::{self, SettingsUpdate};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(orders::dashboard(&state.db).await?))
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CatalogListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<Uuid>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<PaginatedResponse<Category>>> {
    let (page, per_page) = catalog::normalize_page(query.page, query.per_page);
    let (categories, total) =
        catalog::list_categories(&state.db, query.search.as_deref(), page, per_page).await?;
    Ok(Json(PaginatedResponse {
        data: categories,
        total,
        page,
    }))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>> {
    Ok(Json(catalog::get_category(&state.db, id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = catalog::create_category(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    Ok(Json(catalog::update_category(&state.db, id, input).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    catalog::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogListQuery>,
) -> Result<Json<PaginatedResponse<Product>>> {
    let (page, per_page) = catalog::normalize_page(query.page, query.per_page);
    let filter = catalog::ProductFilter {
        search: query.search,
        category_id: query.category,
        only_available: false,
        page,
        per_page,
    };
    let (products, total) = catalog::list_products(&state.db, &filter).await?;
    Ok(Json(PaginatedResponse {
        data: products,
        total,
        page,
    }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>> {
    Ok(Json(catalog::get_product(&state.db, id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = catalog::create_product(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    Ok(Json(catalog::update_product(&state.db, id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    catalog::delete_product(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub reference: String,
}

async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StoreError::Validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .ok_or_else(|| StoreError::Validation("upload is missing a filename".into()))?
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| StoreError::Validation(e.to_string()))?;
            return Ok((filename, bytes.to_vec()));
        }
    }
    Err(StoreError::Validation("no file field in upload".into()))
}

pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let reference = state.files.store(&filename, &bytes).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { reference })))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// A lifecycle status, or "all".
    pub status: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<PaginatedResponse<Order>>> {
    let status = parse_status_filter(query.status.as_deref())?;
    let (page, per_page) = catalog::normalize_page(query.page, query.per_page);
    let (orders, total) = orders::list_orders(&state.db, status, page, per_page).await?;
    Ok(Json(PaginatedResponse {
        data: orders,
        total,
        page,
    }))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn order_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>> {
    let (order, items) = orders::get_order(&state.db, id).await?;
    Ok(Json(OrderDetail { order, items }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: String,
    pub admin_notes: Option<String>,
    pub shipping_service: Option<String>,
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub is_international: bool,
    /// Absent keeps the order's current shipping status.
    pub shipping_status: Option<String>,
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<Order>> {
    let update = OrderUpdate {
        status: parse_order_status(&request.status)?,
        admin_notes: request.admin_notes,
        shipping_service: request.shipping_service,
        tracking_number: request.tracking_number,
        shipping_cost: request.shipping_cost,
        is_international: request.is_international,
        shipping_status: request
            .shipping_status
            .as_deref()
            .map(parse_shipping_status)
            .transpose()?,
    };
    Ok(Json(orders::update_order(&state.db, id, update).await?))
}

#[derive(Debug, Deserialize)]
pub struct TrackingRequest {
    pub tracking_number: Option<String>,
    pub shipping_service: Option<String>,
    pub shipping_status: Option<String>,
}

pub async fn update_tracking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TrackingRequest>,
) -> Result<Json<Order>> {
    let update = TrackingUpdate {
        tracking_number: request.tracking_number,
        shipping_service: request.shipping_service,
        shipping_status: request
            .shipping_status
            .as_deref()
            .map(parse_shipping_status)
            .transpose()?,
    };
    Ok(Json(orders::update_tracking(&state.db, id, update).await?))
}

// ---------------------------------------------------------------------------
// Shipping page
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ShippingListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// A shipping status, or "all".
    pub status: Option<String>,
    /// "all", "domestic" or "international".
    #[serde(rename = "type")]
    pub shipping_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShippingPage {
    pub data: Vec<Order>,
    pub total: i64,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Unexpected failures degrade to an empty page with a visible notice rather
/// than surfacing a raw fault.
pub async fn shipping_list(
    State(state): State<AppState>,
    Query(query): Query<ShippingListQuery>,
) -> Result<Json<ShippingPage>> {
    let shipping_status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(value) => Some(parse_shipping_status(value)?),
    };
    let international = match query.shipping_type.as_deref() {
        None | Some("all") => None,
        Some("domestic") => Some(false),
        Some("international") => Some(true),
        Some(other) => {
            return Err(StoreError::Validation(format!(
                "unknown shipping type '{other}'"
            )))
        }
    };
    let (page, per_page) = catalog::normalize_page(query.page, query.per_page);
    let filter = ShippingFilter {
        shipping_status,
        international,
        page,
        per_page,
    };
    match orders::shipping_list(&state.db, &filter).await {
        Ok((data, total)) => Ok(Json(ShippingPage {
            data,
            total,
            page,
            notice: None,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "shipping page failed, serving safe default");
            Ok(Json(ShippingPage {
                data: vec![],
                total: 0,
                page: 1,
                notice: Some("Error loading shipping page".into()),
            }))
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<CompanySettings>> {
    Ok(Json(settings::get(&state.db).await?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<CompanySettings>> {
    Ok(Json(settings::update(&state.db, update).await?))
}

pub async fn upload_logo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CompanySettings>> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let reference = state.files.store(&filename, &bytes).await?;
    Ok(Json(
        settings::set_logo(&state.db, &state.files, &reference).await?,
    ))
}

pub async fn upload_gallery_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CompanySettings>)> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let reference = state.files.store(&filename, &bytes).await?;
    Ok((
        StatusCode::CREATED,
        Json(settings::add_gallery_image(&state.db, &reference).await?),
    ))
}

pub async fn remove_gallery_image(
    State(state): State<AppState>,
    Path(image): Path<String>,
) -> Result<Json<CompanySettings>> {
    Ok(Json(
        settings::remove_gallery_image(&state.db, &state.files, &image).await?,
    ))
}

fn parse_status_filter(value: Option<&str>) -> Result<Option<OrderStatus>> {
    match value {
        None | Some("all") => Ok(None),
        Some(value) => Ok(Some(parse_order_status(value)?)),
    }
}

fn parse_order_status(value: &str) -> Result<OrderStatus> {
    OrderStatus::parse(value)
        .ok_or_else(|| StoreError::Validation(format!("unknown order status '{value}'")))
}

fn parse_shipping_status(value: &str) -> Result<ShippingStatus> {
    ShippingStatus::parse(value)
        .ok_or_else(|| StoreError::Validation(format!("unknown shipping status '{value}'")))
}
