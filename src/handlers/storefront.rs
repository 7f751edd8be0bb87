//! Public storefront endpoints: browsing, cart and checkout.

use crate::domain::aggregates::cart::{snapshot_total, CartLine};
use crate::domain::aggregates::order::{CustomerInfo, OrderDraft};
use crate::domain::value_objects::{format_amount, Currency};
use crate::error::{Result, StoreError};
use crate::handlers::{resolve_locale, AppState, LocaleQuery, PaginatedResponse};
use crate::locale::LocalePreference;
use crate::models::{CompanySettings, Order, Product};
use crate::sanitize::{sanitize_optional, sanitize_required};
use crate::store::{catalog, orders};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A product plus its display strings for the resolved locale.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub display_name: String,
    pub display_price: String,
}

impl ProductView {
    fn new(product: Product, pref: LocalePreference) -> Self {
        let display_name = product.name(pref.language).to_string();
        let display_price = format_amount(product.price_in(pref.currency), pref.currency);
        Self {
            product,
            display_name,
            display_price,
        }
    }
}

pub async fn get_locale(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LocaleQuery>,
) -> Json<LocalePreference> {
    Json(resolve_locale(&state, &query, &headers))
}

pub async fn public_settings(State(state): State<AppState>) -> Result<Json<CompanySettings>> {
    Ok(Json(crate::store::settings::get(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<PaginatedResponse<crate::models::Category>>> {
    let (page, per_page) = catalog::normalize_page(query.page, query.per_page);
    let (categories, total) =
        catalog::list_categories(&state.db, query.search.as_deref(), page, per_page).await?;
    Ok(Json(PaginatedResponse {
        data: categories,
        total,
        page,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub lang: Option<String>,
    pub currency: Option<String>,
    pub session: Option<String>,
}

impl ProductListQuery {
    fn locale(&self) -> LocaleQuery {
        LocaleQuery {
            lang: self.lang.clone(),
            currency: self.currency.clone(),
            session: self.session.clone(),
        }
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<PaginatedResponse<ProductView>>> {
    let pref = resolve_locale(&state, &query.locale(), &headers);
    let (page, per_page) = catalog::normalize_page(query.page, query.per_page);
    let filter = catalog::ProductFilter {
        search: query.search,
        category_id: query.category,
        only_available: true,
        page,
        per_page,
    };
    let (products, total) = catalog::list_products(&state.db, &filter).await?;
    Ok(Json(PaginatedResponse {
        data: products
            .into_iter()
            .map(|p| ProductView::new(p, pref))
            .collect(),
        total,
        page,
    }))
}

/// Home-page selection: the newest available products.
pub async fn featured_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let pref = resolve_locale(&state, &query, &headers);
    let products = catalog::featured_products(&state.db).await?;
    Ok(Json(
        products
            .into_iter()
            .map(|p| ProductView::new(p, pref))
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: ProductView,
    pub related: Vec<ProductView>,
}

pub async fn product_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<ProductDetail>> {
    let pref = resolve_locale(&state, &query, &headers);
    let product = catalog::get_product(&state.db, id).await?;
    let related = catalog::related_products(&state.db, &product).await?;
    Ok(Json(ProductDetail {
        product: ProductView::new(product, pref),
        related: related
            .into_iter()
            .map(|p| ProductView::new(p, pref))
            .collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product: ProductView,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub display_unit_price: String,
    pub display_line_total: String,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total_amount: Decimal,
    pub display_total: String,
    pub currency: Currency,
}

async fn build_cart_view(
    state: &AppState,
    session_id: &str,
    pref: LocalePreference,
) -> Result<CartView> {
    let cart = state.sessions.cart(session_id);
    let products = catalog::products_by_ids(&state.db, &cart.product_ids()).await?;
    let lines = cart.snapshot(&products, pref.currency);
    let total = snapshot_total(&lines, pref.currency);
    let items = lines
        .into_iter()
        .map(|line: CartLine| CartLineView {
            quantity: line.quantity,
            unit_price: line.unit_price.amount(),
            line_total: line.line_total.amount(),
            display_unit_price: line.unit_price.format(),
            display_line_total: line.line_total.format(),
            product: ProductView::new(line.product, pref),
        })
        .collect();
    Ok(CartView {
        items,
        total_amount: total.amount(),
        display_total: total.format(),
        currency: pref.currency,
    })
}

pub async fn view_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<CartView>> {
    let pref = session_locale(&state, &session, &query, &headers);
    Ok(Json(build_cart_view(&state, &session, pref).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session): Path<String>,
    Query(query): Query<LocaleQuery>,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    request
        .validate()
        .map_err(|e| StoreError::Validation(e.to_string()))?;
    state
        .sessions
        .with_session(&session, |s| s.cart.add(request.product_id, request.quantity));
    let pref = session_locale(&state, &session, &query, &headers);
    Ok((
        StatusCode::CREATED,
        Json(build_cart_view(&state, &session, pref).await?),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: Uuid,
    /// Zero or negative removes the entry.
    pub quantity: i64,
}

pub async fn update_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session): Path<String>,
    Query(query): Query<LocaleQuery>,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let quantity = cart_quantity(request.quantity)?;
    state
        .sessions
        .with_session(&session, |s| s.cart.update(request.product_id, quantity));
    let pref = session_locale(&state, &session, &query, &headers);
    Ok(Json(build_cart_view(&state, &session, pref).await?))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((session, product_id)): Path<(String, Uuid)>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<CartView>> {
    state
        .sessions
        .with_session(&session, |s| s.cart.remove(product_id));
    let pref = session_locale(&state, &session, &query, &headers);
    Ok(Json(build_cart_view(&state, &session, pref).await?))
}

pub async fn clear_cart(State(state): State<AppState>, Path(session): Path<String>) -> StatusCode {
    state.sessions.clear_cart(&session);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_company: Option<String>,
    #[validate(length(min = 1))]
    pub customer_country: String,
    #[validate(length(min = 1))]
    pub shipping_address: String,
    pub notes: Option<String>,
}

/// Places an order from the session cart in the session's currency, then
/// clears the cart. All-or-nothing: an empty snapshot creates nothing.
pub async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session): Path<String>,
    Query(query): Query<LocaleQuery>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    request
        .validate()
        .map_err(|e| StoreError::Validation(e.to_string()))?;
    let pref = session_locale(&state, &session, &query, &headers);

    let cart = state.sessions.cart(&session);
    let products = catalog::products_by_ids(&state.db, &cart.product_ids()).await?;
    let lines = cart.snapshot(&products, pref.currency);

    let customer = CustomerInfo {
        name: sanitize_required("customer_name", &request.customer_name)?,
        email: sanitize_required("customer_email", &request.customer_email)?,
        phone: sanitize_optional(request.customer_phone.as_deref()),
        company: sanitize_optional(request.customer_company.as_deref()),
        country: sanitize_required("customer_country", &request.customer_country)?,
        shipping_address: sanitize_required("shipping_address", &request.shipping_address)?,
        notes: sanitize_optional(request.notes.as_deref()),
    };
    let draft = OrderDraft::from_snapshot(&lines, customer, pref.currency, Utc::now())?;
    let order = orders::place_order(&state.db, &draft).await?;
    state.sessions.clear_cart(&session);
    Ok((StatusCode::CREATED, Json(order)))
}

/// Zero and negative clear the entry; anything above `u32::MAX` is rejected
/// rather than truncated.
fn cart_quantity(raw: i64) -> Result<u32> {
    if raw <= 0 {
        return Ok(0);
    }
    u32::try_from(raw).map_err(|_| StoreError::Validation("quantity is out of range".into()))
}

/// Cart/checkout routes carry their session id in the path, not the query.
fn session_locale(
    state: &AppState,
    session: &str,
    query: &LocaleQuery,
    headers: &HeaderMap,
) -> LocalePreference {
    let query = LocaleQuery {
        lang: query.lang.clone(),
        currency: query.currency.clone(),
        session: Some(session.to_string()),
    };
    resolve_locale(state, &query, headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_quantity_clears_on_zero_or_negative() {
        assert_eq!(cart_quantity(0).unwrap(), 0);
        assert_eq!(cart_quantity(-7).unwrap(), 0);
        assert_eq!(cart_quantity(3).unwrap(), 3);
    }

    #[test]
    fn cart_quantity_rejects_values_past_u32() {
        // 2^32 + 1 used to truncate to 1; it must fail instead.
        assert!(matches!(
            cart_quantity(4_294_967_297),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(cart_quantity(i64::from(u32::MAX)).unwrap(), u32::MAX);
    }
}
