//! Blog API endpoints
//!
//! - GET /api/v1/blog - List published posts with pagination
//! - GET /api/v1/blog/:slug - Get a published post by slug
//! - GET /api/v1/admin/posts - List all posts (admin)
//! - POST /api/v1/admin/posts - Create post (admin)
//! - PUT /api/v1/admin/posts/:id - Update post (admin)
//! - DELETE /api/v1/admin/posts/:id - Delete post (admin)

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreatePostInput, Post, UpdatePostInput};
use crate::services::blog::BlogServiceError;

impl From<BlogServiceError> for ApiError {
    fn from(e: BlogServiceError) -> Self {
        match e {
            BlogServiceError::NotFound(what) => {
                ApiError::not_found(format!("Post not found: {}", what))
            }
            BlogServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            BlogServiceError::DuplicateSlug(slug) => {
                ApiError::new("CONFLICT", format!("Slug already exists: {}", slug))
            }
            BlogServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Wire format for one post
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub content_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub category: String,
    /// JSON array string, as stored
    pub tags: String,
    pub author: String,
    pub status: String,
    pub published_at: Option<String>,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            content_html: post.content_html,
            featured_image: post.featured_image,
            category: post.category,
            tags: post.tags,
            author: post.author,
            status: post.status.to_string(),
            published_at: post.published_at.map(|dt| dt.to_rfc3339()),
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Response for post lists
#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Public blog routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{slug}", get(get_post))
}

/// Admin post routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_posts).post(create_post))
        .route(
            "/{id}",
            axum::routing::put(update_post).delete(delete_post),
        )
}

/// GET /api/v1/blog - published posts, newest first
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = state
        .blog_service
        .list_published(query.page.max(1), query.page_size.clamp(1, 100))
        .await?;

    let total_pages = page.total_pages();
    Ok(Json(PostListResponse {
        posts: page.items.into_iter().map(PostResponse::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages,
    }))
}

/// GET /api/v1/blog/:slug
async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.blog_service.get_published_by_slug(&slug).await?;
    Ok(Json(post.into()))
}

/// GET /api/v1/admin/posts - every post regardless of status
async fn list_all_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = state
        .blog_service
        .list_all(query.page.max(1), query.page_size.clamp(1, 100))
        .await?;

    let total_pages = page.total_pages();
    Ok(Json(PostListResponse {
        posts: page.items.into_iter().map(PostResponse::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages,
    }))
}

/// POST /api/v1/admin/posts
async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<(axum::http::StatusCode, Json<PostResponse>), ApiError> {
    let post = state.blog_service.create(input).await?;
    Ok((axum::http::StatusCode::CREATED, Json(post.into())))
}

/// PUT /api/v1/admin/posts/:id
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.blog_service.update(id, input).await?;
    Ok(Json(post.into()))
}

/// DELETE /api/v1/admin/posts/:id
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.blog_service.delete(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
