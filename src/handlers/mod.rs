//! HTTP surface: routing glue over the stores.

pub mod admin;
pub mod storefront;

use crate::locale::{self, LocalePreference};
use crate::media::FileStore;
use crate::session::SessionStore;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub sessions: SessionStore,
    pub files: Arc<FileStore>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

/// Locale signals a request may carry alongside its session id.
#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub lang: Option<String>,
    pub currency: Option<String>,
    pub session: Option<String>,
}

/// Resolves the effective locale and persists it as the session's new
/// preference when a session id is present.
pub fn resolve_locale(state: &AppState, query: &LocaleQuery, headers: &HeaderMap) -> LocalePreference {
    let stored = query
        .session
        .as_deref()
        .and_then(|sid| state.sessions.locale(sid));
    let pref = locale::resolve(
        query.lang.as_deref(),
        query.currency.as_deref(),
        stored,
        headers,
    );
    if let Some(sid) = query.session.as_deref() {
        state.sessions.set_locale(sid, pref);
    }
    pref
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "agriexport"})) }),
        )
        .route("/api/v1/locale", get(storefront::get_locale))
        .route("/api/v1/settings", get(storefront::public_settings))
        .route("/api/v1/categories", get(storefront::list_categories))
        .route("/api/v1/products", get(storefront::list_products))
        .route(
            "/api/v1/products/featured",
            get(storefront::featured_products),
        )
        .route("/api/v1/products/:id", get(storefront::product_detail))
        .route(
            "/api/v1/cart/:session",
            get(storefront::view_cart)
                .post(storefront::add_to_cart)
                .put(storefront::update_cart)
                .delete(storefront::clear_cart),
        )
        .route(
            "/api/v1/cart/:session/items/:product_id",
            axum::routing::delete(storefront::remove_from_cart),
        )
        .route("/api/v1/checkout/:session", post(storefront::checkout))
        .route("/api/v1/admin/dashboard", get(admin::dashboard))
        .route(
            "/api/v1/admin/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/api/v1/admin/categories/:id",
            get(admin::get_category)
                .put(admin::update_category)
                .delete(admin::delete_category),
        )
        .route(
            "/api/v1/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/api/v1/admin/products/:id",
            get(admin::get_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/api/v1/admin/media", post(admin::upload_media))
        .route("/api/v1/admin/orders", get(admin::list_orders))
        .route(
            "/api/v1/admin/orders/:id",
            get(admin::order_detail).put(admin::update_order),
        )
        .route("/api/v1/admin/orders/:id/tracking", post(admin::update_tracking))
        .route("/api/v1/admin/shipping", get(admin::shipping_list))
        .route(
            "/api/v1/admin/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
        .route("/api/v1/admin/settings/logo", post(admin::upload_logo))
        .route(
            "/api/v1/admin/settings/gallery",
            post(admin::upload_gallery_image),
        )
        .route(
            "/api/v1/admin/settings/gallery/:image",
            axum::routing::delete(admin::remove_gallery_image),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            db: PgPool::connect_lazy("postgres://localhost:1/agriexport_test")
                .expect("lazy pool"),
            sessions: SessionStore::new(),
            files: Arc::new(FileStore::new("/tmp/agriexport-router-test")),
        }
    }

    // The lazy pool has no server behind it, so a wired route surfaces a
    // database error instead of a routing miss.
    #[tokio::test]
    async fn featured_products_route_is_wired() {
        let response = router(test_state())
            .oneshot(
                Request::get("/api/v1/products/featured")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = router(test_state())
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
