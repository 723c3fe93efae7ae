//! Quote enquiry repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Enquiry, NewEnquiry};

/// Enquiry repository trait
#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// Insert a new enquiry and return it with its assigned id
    async fn create(&self, input: &NewEnquiry) -> Result<Enquiry>;

    /// List enquiries, newest first
    async fn list(&self, page: u32, page_size: u32) -> Result<(Vec<Enquiry>, i64)>;

    /// Delete an enquiry by id
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based enquiry repository
pub struct SqlxEnquiryRepository {
    pool: DynDatabasePool,
}

impl SqlxEnquiryRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnquiryRepository for SqlxEnquiryRepository {
    async fn create(&self, input: &NewEnquiry) -> Result<Enquiry> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn list(&self, page: u32, page_size: u32) -> Result<(Vec<Enquiry>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), page, page_size).await
            }
            DatabaseDriver::Mysql => {
                list_mysql(self.pool.as_mysql().unwrap(), page, page_size).await
            }
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

async fn create_sqlite(pool: &SqlitePool, input: &NewEnquiry) -> Result<Enquiry> {
    let result = sqlx::query(
        "INSERT INTO enquiries (name, email, phone, message) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.message)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM enquiries WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    Ok(Enquiry {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        created_at: row.get("created_at"),
    })
}

async fn list_sqlite(pool: &SqlitePool, page: u32, page_size: u32) -> Result<(Vec<Enquiry>, i64)> {
    let offset = (page.saturating_sub(1) as i64) * page_size as i64;
    let rows = sqlx::query("SELECT * FROM enquiries ORDER BY created_at DESC LIMIT ? OFFSET ?")
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enquiries")
        .fetch_one(pool)
        .await?;

    let enquiries = rows
        .into_iter()
        .map(|row| Enquiry {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            phone: row.get("phone"),
            message: row.get("message"),
            created_at: row.get("created_at"),
        })
        .collect();

    Ok((enquiries, total))
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM enquiries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, input: &NewEnquiry) -> Result<Enquiry> {
    let result = sqlx::query(
        "INSERT INTO enquiries (name, email, phone, message) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.message)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM enquiries WHERE id = ?")
        .bind(result.last_insert_id() as i64)
        .fetch_one(pool)
        .await?;

    Ok(Enquiry {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        created_at: row.get("created_at"),
    })
}

async fn list_mysql(pool: &MySqlPool, page: u32, page_size: u32) -> Result<(Vec<Enquiry>, i64)> {
    let offset = (page.saturating_sub(1) as i64) * page_size as i64;
    let rows = sqlx::query("SELECT * FROM enquiries ORDER BY created_at DESC LIMIT ? OFFSET ?")
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enquiries")
        .fetch_one(pool)
        .await?;

    let enquiries = rows
        .into_iter()
        .map(|row| Enquiry {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            phone: row.get("phone"),
            message: row.get("message"),
            created_at: row.get("created_at"),
        })
        .collect();

    Ok((enquiries, total))
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM enquiries WHERE id = ?")
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
        let repo = SqlxEnquiryRepository::new(pool);

        let created = repo
            .create(&NewEnquiry {
                name: "Jo Smith".into(),
                email: "jo@example.co.uk".into(),
                phone: Some("07700 900000".into()),
                message: "Quote for blasting a trailer chassis".into(),
            })
            .await
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.phone.as_deref(), Some("07700 900000"));

        let (list, total) = repo.list(1, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(list[0].email, "jo@example.co.uk");

        assert!(repo.delete(created.id).await.unwrap());
        let (_, total) = repo.list(1, 10).await.unwrap();
        assert_eq!(total, 0);
    }
}
