use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::api::handlers;
use crate::api::handlers::AppState;
use crate::store::traits::IndexStore;
use crate::urls::{
    ACTIVITIES, INDEXER_VERSION, MONITORING, OPENAPI, SITEMAP_FILES, SITEMAP_STATUS, SITEMAP_UPDATE,
};

pub fn create_router<S: IndexStore + 'static>(sitemap_dir: &str) -> Router<AppState<S>> {
    Router::new()
        // API description
        .route("/", get(handlers::get_api_info::<S>))
        .route(OPENAPI, get(handlers::get_openapi_spec::<S>))
        // Health check
        .route("/health", get(handlers::health_check))
        // Record change discovery (Activity Streams)
        .route(ACTIVITIES, get(handlers::get_activities::<S>))
        .route(
            "/activities/:page_no",
            get(handlers::get_activities_page::<S>),
        )
        // Monitoring
        .route(MONITORING, get(handlers::get_monitoring::<S>))
        .route(
            INDEXER_VERSION,
            put(handlers::set_indexer_version::<S>).get(handlers::get_indexer_version::<S>),
        )
        // Sitemap generation and delivery
        .route(SITEMAP_UPDATE, post(handlers::update_sitemap::<S>))
        .route(SITEMAP_STATUS, get(handlers::get_sitemap_status::<S>))
        .nest_service(SITEMAP_FILES, ServeDir::new(sitemap_dir))
}
