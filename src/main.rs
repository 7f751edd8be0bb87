//! AgriExport - Bilingual Agricultural-Export Storefront

use agriexport::handlers::{router, AppState};
use agriexport::media::FileStore;
use agriexport::session::SessionStore;
use agriexport::store::settings;
use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    // The settings singleton is created here, not lazily on first read, so
    // concurrent first requests never race on it.
    settings::bootstrap(&db).await?;

    let files = FileStore::new(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
    files.init().await?;

    let state = AppState {
        db,
        sessions: SessionStore::new(),
        files: Arc::new(files),
    };
    let app = router(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8084".to_string());
    tracing::info!("AgriExport storefront listening on 0.0.0.0:{}", port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?,
        app,
    )
    .await?;
    Ok(())
}
