//! Gallery project repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{GalleryProject, NewGalleryProject};

/// Gallery repository trait
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Insert a new project and return it with its assigned id
    async fn create(&self, input: &NewGalleryProject) -> Result<GalleryProject>;

    /// List all projects, newest first
    async fn list_all(&self) -> Result<Vec<GalleryProject>>;

    /// Delete a project by id
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based gallery repository
pub struct SqlxGalleryRepository {
    pool: DynDatabasePool,
}

impl SqlxGalleryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GalleryRepository for SqlxGalleryRepository {
    async fn create(&self, input: &NewGalleryProject) -> Result<GalleryProject> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<GalleryProject>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_all_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_all_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, input: &NewGalleryProject) -> Result<GalleryProject> {
    let result = sqlx::query(
        "INSERT INTO gallery_projects (title, before_url, after_url, thumbnail_url)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.before_url)
    .bind(&input.after_url)
    .bind(&input.thumbnail_url)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM gallery_projects WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    Ok(GalleryProject {
        id: row.get("id"),
        title: row.get("title"),
        before_url: row.get("before_url"),
        after_url: row.get("after_url"),
        thumbnail_url: row.get("thumbnail_url"),
        created_at: row.get("created_at"),
    })
}

async fn list_all_sqlite(pool: &SqlitePool) -> Result<Vec<GalleryProject>> {
    let rows = sqlx::query("SELECT * FROM gallery_projects ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| GalleryProject {
            id: row.get("id"),
            title: row.get("title"),
            before_url: row.get("before_url"),
            after_url: row.get("after_url"),
            thumbnail_url: row.get("thumbnail_url"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM gallery_projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, input: &NewGalleryProject) -> Result<GalleryProject> {
    let result = sqlx::query(
        "INSERT INTO gallery_projects (title, before_url, after_url, thumbnail_url)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.before_url)
    .bind(&input.after_url)
    .bind(&input.thumbnail_url)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM gallery_projects WHERE id = ?")
        .bind(result.last_insert_id() as i64)
        .fetch_one(pool)
        .await?;

    Ok(GalleryProject {
        id: row.get("id"),
        title: row.get("title"),
        before_url: row.get("before_url"),
        after_url: row.get("after_url"),
        thumbnail_url: row.get("thumbnail_url"),
        created_at: row.get("created_at"),
    })
}

async fn list_all_mysql(pool: &MySqlPool) -> Result<Vec<GalleryProject>> {
    let rows = sqlx::query("SELECT * FROM gallery_projects ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| GalleryProject {
            id: row.get("id"),
            title: row.get("title"),
            before_url: row.get("before_url"),
            after_url: row.get("after_url"),
            thumbnail_url: row.get("thumbnail_url"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM gallery_projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn create_list_delete() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        let project = repo
            .create(&NewGalleryProject {
                title: "Victorian railings, Bury".into(),
                before_url: "/uploads/gallery/railings-before.jpg".into(),
                after_url: "/uploads/gallery/railings-after.jpg".into(),
                thumbnail_url: Some("/uploads/gallery/railings-thumb.webp".into()),
            })
            .await
            .unwrap();
        assert!(project.id > 0);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Victorian railings, Bury");

        assert!(repo.delete(project.id).await.unwrap());
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
