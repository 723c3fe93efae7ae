//! Blog service
//!
//! Business logic for blog posts:
//! - Public listing (published only, paginated) and detail by slug
//! - Admin create, update, delete
//! - Markdown rendering on save
//! - Cache invalidation on every write

use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, Page, Post, PostStatus, UpdatePostInput};
use crate::services::markdown::MarkdownRenderer;

/// Cache TTL for single posts (1 hour)
const POST_CACHE_TTL_SECS: u64 = 3600;

/// Cache TTL for list pages (10 minutes - lists should refresh faster)
const POST_LIST_CACHE_TTL_SECS: u64 = 600;

const CACHE_KEY_POST_BY_SLUG: &str = "posts:slug:";
const CACHE_KEY_POST_LIST: &str = "posts:list";

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Post slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Blog service for managing posts
pub struct BlogService {
    repo: Arc<dyn PostRepository>,
    cache: Arc<Cache>,
    markdown_renderer: MarkdownRenderer,
}

impl BlogService {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        cache: Arc<Cache>,
        markdown_renderer: MarkdownRenderer,
    ) -> Self {
        Self {
            repo,
            cache,
            markdown_renderer,
        }
    }

    /// List published posts, newest first. Results are cached per page.
    pub async fn list_published(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Post>, BlogServiceError> {
        let cache_key = format!("{}:{}:{}", CACHE_KEY_POST_LIST, page, page_size);

        if let Ok(Some(cached)) = self.cache.get::<Page<Post>>(&cache_key).await {
            return Ok(cached);
        }

        let (items, total) = self
            .repo
            .list(Some(PostStatus::Published), page, page_size)
            .await
            .context("Failed to list posts")?;

        let result = Page {
            items,
            total,
            page,
            page_size,
        };

        let _ = self
            .cache
            .set(
                &cache_key,
                &result,
                Duration::from_secs(POST_LIST_CACHE_TTL_SECS),
            )
            .await;

        Ok(result)
    }

    /// List every post regardless of status (admin view, uncached)
    pub async fn list_all(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Post>, BlogServiceError> {
        let (items, total) = self
            .repo
            .list(None, page, page_size)
            .await
            .context("Failed to list posts")?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Get a published post by slug. Drafts and archived posts are not
    /// visible through this path.
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Post, BlogServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_POST_BY_SLUG, slug);

        if let Ok(Some(cached)) = self.cache.get::<Post>(&cache_key).await {
            return Ok(cached);
        }

        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to fetch post")?
            .filter(|p| p.status == PostStatus::Published)
            .ok_or_else(|| BlogServiceError::NotFound(slug.to_string()))?;

        let _ = self
            .cache
            .set(&cache_key, &post, Duration::from_secs(POST_CACHE_TTL_SECS))
            .await;

        Ok(post)
    }

    /// Get any post by id (admin view)
    pub async fn get_by_id(&self, id: i64) -> Result<Post, BlogServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to fetch post")?
            .ok_or_else(|| BlogServiceError::NotFound(id.to_string()))
    }

    /// Create a post, rendering its Markdown content
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, BlogServiceError> {
        validate_slug(&input.slug)?;
        if input.title.trim().is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Title must not be empty".into(),
            ));
        }
        if input.content.trim().is_empty() {
            return Err(BlogServiceError::ValidationError(
                "Content must not be empty".into(),
            ));
        }

        if self
            .repo
            .get_by_slug(&input.slug)
            .await
            .context("Failed to check slug")?
            .is_some()
        {
            return Err(BlogServiceError::DuplicateSlug(input.slug));
        }

        let content_html = self.markdown_renderer.render(&input.content);
        let tags =
            serde_json::to_string(&input.tags).context("Failed to serialize tags")?;

        let mut post = Post::new(
            input.slug,
            input.title,
            input.excerpt,
            input.content,
            content_html,
            input.category,
            tags,
            input.author,
            input.status,
        );
        post.featured_image = input.featured_image;

        let created = self.repo.create(post).await.context("Failed to create post")?;

        self.invalidate_cache(&created.slug).await;
        Ok(created)
    }

    /// Apply a partial update to a post, re-rendering content when it changes
    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Post, BlogServiceError> {
        let mut post = self.get_by_id(id).await?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(BlogServiceError::ValidationError(
                    "Title must not be empty".into(),
                ));
            }
            post.title = title;
        }
        if let Some(excerpt) = input.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(content) = input.content {
            if content.trim().is_empty() {
                return Err(BlogServiceError::ValidationError(
                    "Content must not be empty".into(),
                ));
            }
            post.content_html = self.markdown_renderer.render(&content);
            post.content = content;
        }
        if let Some(featured_image) = input.featured_image {
            post.featured_image = Some(featured_image);
        }
        if let Some(category) = input.category {
            post.category = category;
        }
        if let Some(tags) = input.tags {
            post.tags = serde_json::to_string(&tags).context("Failed to serialize tags")?;
        }
        if let Some(status) = input.status {
            // First publish stamps the publication time
            if status == PostStatus::Published && post.published_at.is_none() {
                post.published_at = Some(Utc::now());
            }
            post.status = status;
        }

        let updated = self.repo.update(&post).await.context("Failed to update post")?;
        if !updated {
            return Err(BlogServiceError::NotFound(id.to_string()));
        }

        self.invalidate_cache(&post.slug).await;
        self.get_by_id(id).await
    }

    /// Delete a post by id
    pub async fn delete(&self, id: i64) -> Result<(), BlogServiceError> {
        let post = self.get_by_id(id).await?;

        let deleted = self.repo.delete(id).await.context("Failed to delete post")?;
        if !deleted {
            return Err(BlogServiceError::NotFound(id.to_string()));
        }

        self.invalidate_cache(&post.slug).await;
        Ok(())
    }

    /// Drop every cache entry touching this post
    async fn invalidate_cache(&self, slug: &str) {
        let _ = self
            .cache
            .delete(&format!("{}{}", CACHE_KEY_POST_BY_SLUG, slug))
            .await;
        let _ = self.cache.delete_pattern("posts:list*").await;
    }
}

/// Slugs are lowercase alphanumerics and hyphens, non-empty
fn validate_slug(slug: &str) -> Result<(), BlogServiceError> {
    if slug.is_empty()
        || !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(BlogServiceError::ValidationError(format!(
            "Invalid slug: '{}'",
            slug
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxPostRepository;
    use crate::db::{create_test_pool, migrations};

    async fn service() -> BlogService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let cache = create_cache(&CacheConfig::default()).await.unwrap();
        BlogService::new(
            Arc::new(SqlxPostRepository::new(pool)),
            cache,
            MarkdownRenderer::new(),
        )
    }

    fn input(slug: &str, status: PostStatus) -> CreatePostInput {
        CreatePostInput {
            slug: slug.into(),
            title: "Choosing the right abrasive".into(),
            excerpt: "Grit, shot or bead?".into(),
            content: "## Grit\n\nAngular and aggressive.".into(),
            featured_image: None,
            category: "guides".into(),
            tags: vec!["abrasive".into()],
            author: "Site Team".into(),
            status,
        }
    }

    #[tokio::test]
    async fn create_renders_markdown() {
        let service = service().await;
        let post = service
            .create(input("abrasives", PostStatus::Published))
            .await
            .unwrap();
        assert!(post.content_html.contains("<h2>"));
        assert_eq!(post.tag_list(), vec!["abrasive"]);
    }

    #[tokio::test]
    async fn duplicate_slug_rejected() {
        let service = service().await;
        service
            .create(input("dup", PostStatus::Draft))
            .await
            .unwrap();
        let err = service.create(input("dup", PostStatus::Draft)).await;
        assert!(matches!(err, Err(BlogServiceError::DuplicateSlug(_))));
    }

    #[tokio::test]
    async fn invalid_slug_and_empty_fields_rejected() {
        let service = service().await;

        let mut bad = input("Bad Slug!", PostStatus::Draft);
        assert!(matches!(
            service.create(bad.clone()).await,
            Err(BlogServiceError::ValidationError(_))
        ));

        bad.slug = "ok".into();
        bad.title = "  ".into();
        assert!(matches!(
            service.create(bad).await,
            Err(BlogServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn drafts_hidden_from_public_surface() {
        let service = service().await;
        service
            .create(input("visible", PostStatus::Published))
            .await
            .unwrap();
        service
            .create(input("hidden", PostStatus::Draft))
            .await
            .unwrap();

        let page = service.list_published(1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "visible");

        assert!(service.get_published_by_slug("visible").await.is_ok());
        assert!(matches!(
            service.get_published_by_slug("hidden").await,
            Err(BlogServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn publishing_draft_stamps_published_at() {
        let service = service().await;
        let post = service
            .create(input("later", PostStatus::Draft))
            .await
            .unwrap();
        assert!(post.published_at.is_none());

        let updated = service
            .update(
                post.id,
                UpdatePostInput {
                    status: Some(PostStatus::Published),
                    ..UpdatePostInput::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.published_at.is_some());
    }

    #[tokio::test]
    async fn update_rerenders_content_and_delete_removes() {
        let service = service().await;
        let post = service
            .create(input("cycle", PostStatus::Published))
            .await
            .unwrap();

        let updated = service
            .update(
                post.id,
                UpdatePostInput {
                    content: Some("# New heading".into()),
                    ..UpdatePostInput::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.content_html.contains("<h1>"));

        service.delete(post.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(post.id).await,
            Err(BlogServiceError::NotFound(_))
        ));
    }
}
