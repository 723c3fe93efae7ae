//! Server-rendered site pages
//!
//! - GET / - Home
//! - GET /areas, /areas/:slug - Service-area pages from LocationProfile records
//! - GET /gallery - Before/after gallery with the comparison slider
//! - GET /blog, /blog/:slug - Blog listing and detail

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::middleware::AppState;
use crate::services::blog::BlogServiceError;
use crate::site::{ComparisonSlider, SiteError};

/// One rendering failure type for every page handler
type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

fn render_failure(e: SiteError) -> (StatusCode, Html<String>) {
    tracing::error!("Page render failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Something went wrong</h1>".to_string()),
    )
}

fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html("<h1>Page not found</h1>".to_string()),
    )
}

/// Site page routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/areas", get(areas_index))
        .route("/areas/{slug}", get(area_page))
        .route("/gallery", get(gallery_page))
        .route("/blog", get(blog_index))
        .route("/blog/{slug}", get(blog_post_page))
}

/// GET /
async fn home(State(state): State<AppState>) -> PageResult {
    let mut ctx = state.renderer.base_context();
    ctx.insert("locations", &state.locations.all());

    // The home page still renders when the blog is empty or unavailable
    let posts = state
        .blog_service
        .list_published(1, 3)
        .await
        .map(|page| page.items)
        .unwrap_or_default();
    ctx.insert("posts", &posts);

    state
        .renderer
        .render("home.html", &ctx)
        .map(Html)
        .map_err(render_failure)
}

/// GET /areas
async fn areas_index(State(state): State<AppState>) -> PageResult {
    let mut ctx = state.renderer.base_context();
    ctx.insert("locations", &state.locations.all());

    state
        .renderer
        .render("areas.html", &ctx)
        .map(Html)
        .map_err(render_failure)
}

/// GET /areas/:slug
async fn area_page(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult {
    let Some(profile) = state.locations.get(&slug) else {
        return Err(not_found());
    };

    let mut ctx = state.renderer.base_context();
    ctx.insert("location", profile);

    state
        .renderer
        .render("area.html", &ctx)
        .map(Html)
        .map_err(render_failure)
}

/// GET /gallery
///
/// The initial divider state comes from the slider model so the server
/// markup and the client script agree on the rendering rule.
async fn gallery_page(State(state): State<AppState>) -> PageResult {
    let projects = state.gallery_repo.list_all().await.unwrap_or_default();
    let slider = ComparisonSlider::default();

    let mut ctx = state.renderer.base_context();
    ctx.insert("projects", &projects);
    ctx.insert("initial_position", &slider.position());
    ctx.insert("initial_clip", &slider.clip_inset());

    state
        .renderer
        .render("gallery.html", &ctx)
        .map(Html)
        .map_err(render_failure)
}

#[derive(Debug, Deserialize)]
struct BlogPageQuery {
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

/// GET /blog
async fn blog_index(
    State(state): State<AppState>,
    Query(query): Query<BlogPageQuery>,
) -> PageResult {
    let page = state
        .blog_service
        .list_published(query.page.max(1), 10)
        .await
        .map_err(|e| {
            render_failure(SiteError::RenderError {
                name: "blog.html".into(),
                message: e.to_string(),
            })
        })?;

    let mut ctx = state.renderer.base_context();
    ctx.insert("posts", &page.items);
    ctx.insert("page", &page.page);
    ctx.insert("total_pages", &page.total_pages());

    state
        .renderer
        .render("blog.html", &ctx)
        .map(Html)
        .map_err(render_failure)
}

/// GET /blog/:slug
async fn blog_post_page(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult {
    let post = match state.blog_service.get_published_by_slug(&slug).await {
        Ok(post) => post,
        Err(BlogServiceError::NotFound(_)) => return Err(not_found()),
        Err(e) => {
            tracing::error!("Blog post fetch failed: {}", e);
            return Err(render_failure(SiteError::RenderError {
                name: "blog_post.html".into(),
                message: e.to_string(),
            }));
        }
    };

    let mut ctx = state.renderer.base_context();
    ctx.insert("post", &post);

    state
        .renderer
        .render("blog_post.html", &ctx)
        .map(Html)
        .map_err(render_failure)
}
