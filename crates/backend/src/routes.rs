use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Technique handlers
        .route(
            "/api/techniques",
            get(handlers::a001_technique::list_all).post(handlers::a001_technique::upsert),
        )
        .route(
            "/api/techniques/:id",
            get(handlers::a001_technique::get_by_id).delete(handlers::a001_technique::delete),
        )
        // A002 Season handlers
        .route(
            "/api/seasons",
            get(handlers::a002_season::list_all).post(handlers::a002_season::upsert),
        )
        .route(
            "/api/seasons/:id",
            get(handlers::a002_season::get_by_id).delete(handlers::a002_season::delete),
        )
        // A003 Product handlers
        .route(
            "/api/products",
            get(handlers::a003_product::list_all).post(handlers::a003_product::upsert),
        )
        .route(
            "/api/products/:id",
            get(handlers::a003_product::get_by_id).delete(handlers::a003_product::delete),
        )
        .route(
            "/api/products/slug/:slug",
            get(handlers::a003_product::get_by_slug),
        )
        // U401 Bulk import pipeline
        .route(
            "/api/bulk-upload/images",
            post(handlers::u401_bulk_import::upload_images)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/bulk-upload/parse-csv",
            post(handlers::u401_bulk_import::parse_csv)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/bulk-upload/create-products",
            post(handlers::u401_bulk_import::create_products),
        )
        .route(
            "/api/bulk-upload/template",
            get(handlers::u401_bulk_import::download_template),
        )
}
