//! Blog post repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Post, PostStatus};

/// Blog post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post and return it with its assigned id
    async fn create(&self, post: Post) -> Result<Post>;

    /// Get a post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Get a post by id
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// List posts, optionally restricted to one status, newest first
    async fn list(
        &self,
        status: Option<PostStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Post>, i64)>;

    /// Persist changed fields of an existing post
    async fn update(&self, post: &Post) -> Result<bool>;

    /// Delete a post by id
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based post repository
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), post).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), post).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => get_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(
        &self,
        status: Option<PostStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Post>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), status, page, page_size).await
            }
            DatabaseDriver::Mysql => {
                list_mysql(self.pool.as_mysql().unwrap(), status, page, page_size).await
            }
        }
    }

    async fn update(&self, post: &Post) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), post).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), post).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        content_html: row.get("content_html"),
        featured_image: row.get("featured_image"),
        category: row.get("category"),
        tags: row.get("tags"),
        author: row.get("author"),
        status: PostStatus::from_str(row.get::<String, _>("status").as_str())
            .unwrap_or(PostStatus::Draft),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn mysql_row_to_post(row: &sqlx::mysql::MySqlRow) -> Post {
    Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        content_html: row.get("content_html"),
        featured_image: row.get("featured_image"),
        category: row.get("category"),
        tags: row.get("tags"),
        author: row.get("author"),
        status: PostStatus::from_str(row.get::<String, _>("status").as_str())
            .unwrap_or(PostStatus::Draft),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, mut post: Post) -> Result<Post> {
    let result = sqlx::query(
        "INSERT INTO posts (slug, title, excerpt, content, content_html, featured_image,
                            category, tags, author, status, published_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.content_html)
    .bind(&post.featured_image)
    .bind(&post.category)
    .bind(&post.tags)
    .bind(&post.author)
    .bind(post.status.as_str())
    .bind(post.published_at)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(pool)
    .await?;

    post.id = result.last_insert_rowid();
    Ok(post)
}

async fn get_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query("SELECT * FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| row_to_post(&r)))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| row_to_post(&r)))
}

async fn list_sqlite(
    pool: &SqlitePool,
    status: Option<PostStatus>,
    page: u32,
    page_size: u32,
) -> Result<(Vec<Post>, i64)> {
    let offset = (page.saturating_sub(1) as i64) * page_size as i64;

    let (rows, total) = if let Some(status) = status {
        let rows = sqlx::query(
            "SELECT * FROM posts WHERE status = ?
             ORDER BY published_at DESC, created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(status.as_str())
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
        (rows, total)
    } else {
        let rows = sqlx::query(
            "SELECT * FROM posts ORDER BY published_at DESC, created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await?;
        (rows, total)
    };

    Ok((rows.iter().map(row_to_post).collect(), total))
}

async fn update_sqlite(pool: &SqlitePool, post: &Post) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE posts SET title = ?, excerpt = ?, content = ?, content_html = ?,
                          featured_image = ?, category = ?, tags = ?, status = ?,
                          published_at = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&post.title)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.content_html)
    .bind(&post.featured_image)
    .bind(&post.category)
    .bind(&post.tags)
    .bind(post.status.as_str())
    .bind(post.published_at)
    .bind(Utc::now())
    .bind(post.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, mut post: Post) -> Result<Post> {
    let result = sqlx::query(
        "INSERT INTO posts (slug, title, excerpt, content, content_html, featured_image,
                            category, tags, author, status, published_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&post.slug)
    .bind(&post.title)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.content_html)
    .bind(&post.featured_image)
    .bind(&post.category)
    .bind(&post.tags)
    .bind(&post.author)
    .bind(post.status.as_str())
    .bind(post.published_at)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(pool)
    .await?;

    post.id = result.last_insert_id() as i64;
    Ok(post)
}

async fn get_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query("SELECT * FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| mysql_row_to_post(&r)))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| mysql_row_to_post(&r)))
}

async fn list_mysql(
    pool: &MySqlPool,
    status: Option<PostStatus>,
    page: u32,
    page_size: u32,
) -> Result<(Vec<Post>, i64)> {
    let offset = (page.saturating_sub(1) as i64) * page_size as i64;

    let (rows, total) = if let Some(status) = status {
        let rows = sqlx::query(
            "SELECT * FROM posts WHERE status = ?
             ORDER BY published_at DESC, created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(status.as_str())
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
        (rows, total)
    } else {
        let rows = sqlx::query(
            "SELECT * FROM posts ORDER BY published_at DESC, created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await?;
        (rows, total)
    };

    Ok((rows.iter().map(mysql_row_to_post).collect(), total))
}

async fn update_mysql(pool: &MySqlPool, post: &Post) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE posts SET title = ?, excerpt = ?, content = ?, content_html = ?,
                          featured_image = ?, category = ?, tags = ?, status = ?,
                          published_at = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&post.title)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.content_html)
    .bind(&post.featured_image)
    .bind(&post.category)
    .bind(&post.tags)
    .bind(post.status.as_str())
    .bind(post.published_at)
    .bind(Utc::now())
    .bind(post.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn repo() -> SqlxPostRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxPostRepository::new(pool)
    }

    fn sample(slug: &str, status: PostStatus) -> Post {
        Post::new(
            slug.into(),
            "Why blast-clean structural steel".into(),
            "A primer.".into(),
            "## Steel prep".into(),
            "<h2>Steel prep</h2>".into(),
            "guides".into(),
            "[\"steel\"]".into(),
            "Site Team".into(),
            status,
        )
    }

    #[tokio::test]
    async fn create_and_fetch_by_slug() {
        let repo = repo().await;
        let created = repo
            .create(sample("steel-prep", PostStatus::Published))
            .await
            .unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_slug("steel-prep").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.status, PostStatus::Published);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let repo = repo().await;
        repo.create(sample("a", PostStatus::Published)).await.unwrap();
        repo.create(sample("b", PostStatus::Draft)).await.unwrap();
        repo.create(sample("c", PostStatus::Published)).await.unwrap();

        let (published, total) = repo
            .list(Some(PostStatus::Published), 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(published.len(), 2);

        let (all, total_all) = repo.list(None, 1, 10).await.unwrap();
        assert_eq!(total_all, 3);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn list_paginates() {
        let repo = repo().await;
        for i in 0..5 {
            repo.create(sample(&format!("post-{}", i), PostStatus::Published))
                .await
                .unwrap();
        }

        let (page1, total) = repo.list(None, 1, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page1.len(), 2);

        let (page3, _) = repo.list(None, 3, 2).await.unwrap();
        assert_eq!(page3.len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = repo().await;
        let mut post = repo.create(sample("u", PostStatus::Draft)).await.unwrap();

        post.title = "Updated title".into();
        post.status = PostStatus::Published;
        assert!(repo.update(&post).await.unwrap());

        let fetched = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Updated title");
        assert_eq!(fetched.status, PostStatus::Published);

        assert!(repo.delete(post.id).await.unwrap());
        assert!(repo.get_by_id(post.id).await.unwrap().is_none());
        assert!(!repo.delete(post.id).await.unwrap());
    }
}
