//! Content checkpoint repository
//!
//! Version-history metadata. `mark_as_current` clears the flag on every
//! other row in the same transaction so at most one checkpoint is current.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Checkpoint;

/// Checkpoint repository trait
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Insert a checkpoint record
    async fn create(&self, label: &str, description: &str) -> Result<Checkpoint>;

    /// List all checkpoints, newest first
    async fn list_all(&self) -> Result<Vec<Checkpoint>>;

    /// Get one checkpoint by id
    async fn get_by_id(&self, id: i64) -> Result<Option<Checkpoint>>;

    /// Flag one checkpoint as current and unflag the rest.
    /// Returns false when the id does not exist.
    async fn mark_as_current(&self, id: i64) -> Result<bool>;

    /// Delete a checkpoint by id
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based checkpoint repository
pub struct SqlxCheckpointRepository {
    pool: DynDatabasePool,
}

impl SqlxCheckpointRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointRepository for SqlxCheckpointRepository {
    async fn create(&self, label: &str, description: &str) -> Result<Checkpoint> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), label, description).await
            }
            DatabaseDriver::Mysql => {
                create_mysql(self.pool.as_mysql().unwrap(), label, description).await
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<Checkpoint>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_all_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_all_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Checkpoint>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn mark_as_current(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                mark_as_current_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                mark_as_current_mysql(self.pool.as_mysql().unwrap(), id).await
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

fn sqlite_row_to_checkpoint(row: &sqlx::sqlite::SqliteRow) -> Checkpoint {
    Checkpoint {
        id: row.get("id"),
        label: row.get("label"),
        description: row.get("description"),
        is_current: row.get("is_current"),
        created_at: row.get("created_at"),
    }
}

fn mysql_row_to_checkpoint(row: &sqlx::mysql::MySqlRow) -> Checkpoint {
    Checkpoint {
        id: row.get("id"),
        label: row.get("label"),
        description: row.get("description"),
        is_current: row.get("is_current"),
        created_at: row.get("created_at"),
    }
}

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, label: &str, description: &str) -> Result<Checkpoint> {
    let result = sqlx::query("INSERT INTO checkpoints (label, description) VALUES (?, ?)")
        .bind(label)
        .bind(description)
        .execute(pool)
        .await?;

    let row = sqlx::query("SELECT * FROM checkpoints WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    Ok(sqlite_row_to_checkpoint(&row))
}

async fn list_all_sqlite(pool: &SqlitePool) -> Result<Vec<Checkpoint>> {
    let rows = sqlx::query("SELECT * FROM checkpoints ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(sqlite_row_to_checkpoint).collect())
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Checkpoint>> {
    let row = sqlx::query("SELECT * FROM checkpoints WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| sqlite_row_to_checkpoint(&r)))
}

async fn mark_as_current_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query("UPDATE checkpoints SET is_current = 1 WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if updated == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE checkpoints SET is_current = 0 WHERE id != ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM checkpoints WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, label: &str, description: &str) -> Result<Checkpoint> {
    let result = sqlx::query("INSERT INTO checkpoints (label, description) VALUES (?, ?)")
        .bind(label)
        .bind(description)
        .execute(pool)
        .await?;

    let row = sqlx::query("SELECT * FROM checkpoints WHERE id = ?")
        .bind(result.last_insert_id() as i64)
        .fetch_one(pool)
        .await?;

    Ok(mysql_row_to_checkpoint(&row))
}

async fn list_all_mysql(pool: &MySqlPool) -> Result<Vec<Checkpoint>> {
    let rows = sqlx::query("SELECT * FROM checkpoints ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(mysql_row_to_checkpoint).collect())
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Checkpoint>> {
    let row = sqlx::query("SELECT * FROM checkpoints WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| mysql_row_to_checkpoint(&r)))
}

async fn mark_as_current_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query("UPDATE checkpoints SET is_current = TRUE WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if updated == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE checkpoints SET is_current = FALSE WHERE id != ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM checkpoints WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn repo() -> SqlxCheckpointRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxCheckpointRepository::new(pool)
    }

    #[tokio::test]
    async fn at_most_one_current() {
        let repo = repo().await;
        let a = repo.create("pre-launch", "before go-live").await.unwrap();
        let b = repo.create("new-areas", "added 6 area pages").await.unwrap();

        assert!(repo.mark_as_current(a.id).await.unwrap());
        assert!(repo.mark_as_current(b.id).await.unwrap());

        let all = repo.list_all().await.unwrap();
        let current: Vec<_> = all.iter().filter(|c| c.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].id, b.id);
    }

    #[tokio::test]
    async fn mark_unknown_id_is_false_and_keeps_flags() {
        let repo = repo().await;
        let a = repo.create("only", "").await.unwrap();
        assert!(repo.mark_as_current(a.id).await.unwrap());

        assert!(!repo.mark_as_current(9999).await.unwrap());

        let all = repo.list_all().await.unwrap();
        assert!(all[0].is_current);
    }

    #[tokio::test]
    async fn delete_checkpoint() {
        let repo = repo().await;
        let a = repo.create("x", "").await.unwrap();
        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());
        assert!(repo.get_by_id(a.id).await.unwrap().is_none());
    }
}
