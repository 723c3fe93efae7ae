//! Blastline - marketing site and content backend for a UK shot-blasting
//! services company

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blastline::{
    api::{self, AppState, RequestStats},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCallEventRepository, SqlxCheckpointRepository, SqlxEnquiryRepository,
            SqlxGalleryRepository, SqlxPostRepository, SqlxSettingsRepository,
            SqlxVitalsRepository,
        },
    },
    services::{
        imaging::VariantConfig, BlogService, CallTrackingService, ConsentStore, EnquiryMailer,
        EnquiryService, ImageVariantGenerator, MarkdownRenderer, VersionHistoryService,
        VitalsService,
    },
    site::{LocationRegistry, SiteRenderer},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blastline=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Blastline site server...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    if config.admin.token.is_none() {
        tracing::warn!("No admin token configured; the admin API is disabled");
    }

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = create_cache(&config.cache).await?;
    tracing::info!("Cache initialized");

    // Load location profiles (one per service-area page)
    let locations = Arc::new(LocationRegistry::load(&config.site.locations_path)?);

    // Initialize the page renderer
    let renderer = Arc::new(SiteRenderer::new(config.site.clone())?);
    tracing::info!("Site renderer initialized");

    // Create repositories
    let post_repo = Arc::new(SqlxPostRepository::new(pool.clone()));
    let enquiry_repo = Arc::new(SqlxEnquiryRepository::new(pool.clone()));
    let call_repo = Arc::new(SqlxCallEventRepository::new(pool.clone()));
    let checkpoint_repo = Arc::new(SqlxCheckpointRepository::new(pool.clone()));
    let gallery_repo = Arc::new(SqlxGalleryRepository::new(pool.clone()));
    let vitals_repo = Arc::new(SqlxVitalsRepository::new(pool.clone()));
    let settings_repo = Arc::new(SqlxSettingsRepository::new(pool.clone()));

    // Initialize services
    let markdown_renderer = MarkdownRenderer::new();
    let blog_service = Arc::new(BlogService::new(
        post_repo,
        cache.clone(),
        markdown_renderer,
    ));

    let mailer = Arc::new(EnquiryMailer::new(settings_repo.clone()));
    let enquiry_service = Arc::new(EnquiryService::new(enquiry_repo).with_mailer(mailer));

    let call_tracking = Arc::new(CallTrackingService::new(call_repo));
    let version_history = Arc::new(VersionHistoryService::new(checkpoint_repo));
    let vitals_service = Arc::new(VitalsService::new(vitals_repo));
    let consent_store = Arc::new(ConsentStore::new(settings_repo));

    let generator = Arc::new(ImageVariantGenerator::new(VariantConfig::from(
        &config.upload,
    )));
    if config.upload.generate_webp && !generator.webp_available() {
        tracing::warn!("WebP encoding unavailable; uploads will produce JPEG only");
    }

    // Build application state
    let state = AppState {
        blog_service,
        enquiry_service,
        call_tracking,
        version_history,
        vitals_service,
        consent_store,
        gallery_repo,
        generator,
        renderer,
        locations,
        upload_config: Arc::new(config.upload.clone()),
        admin_config: Arc::new(config.admin.clone()),
        request_stats: Arc::new(RequestStats::new()),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
