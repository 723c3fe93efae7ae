//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the Blastline site server:
//! - Server-rendered site pages (home, areas, gallery, blog)
//! - Public JSON API (blog, contact, calls, vitals, consent, gallery)
//! - Admin JSON API behind a bearer token (posts, enquiries, versions,
//!   gallery, uploads, analytics)
//! - Embedded static assets and uploaded file serving

pub mod blog;
pub mod call_tracking;
pub mod common;
pub mod consent;
pub mod contact;
pub mod gallery;
pub mod middleware;
pub mod pages;
pub mod static_files;
pub mod upload;
pub mod version_history;
pub mod vitals;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

pub use middleware::{ApiError, AppState, RequestStats};

/// Build the JSON API router mounted under /api/v1
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (bearer token required)
    let admin_routes = Router::new()
        .nest("/admin/posts", blog::admin_router())
        .nest("/admin/enquiries", contact::admin_router())
        .nest("/admin/versions", version_history::router())
        .nest("/admin/gallery", gallery::admin_router())
        .nest("/admin/upload", upload::router())
        .route("/admin/analytics", get(call_tracking::analytics))
        .route("/admin/vitals", get(vitals::summaries))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_admin,
        ));

    // Public routes
    Router::new()
        .nest("/blog", blog::router())
        .nest("/contact", contact::router())
        .nest("/calls", call_tracking::router())
        .nest("/vitals", vitals::router())
        .nest("/consent", consent::router())
        .nest("/gallery", gallery::router())
        .merge(admin_routes)
}

/// Build the complete router with site pages, static serving, and middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .merge(pages::router())
        .route("/static/{*path}", get(static_files::serve_static))
        .nest_service(
            "/uploads",
            ServeDir::new(state.upload_config.path.clone()),
        )
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
