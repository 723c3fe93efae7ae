//! Settings repository
//!
//! Key-value store backing runtime-editable site state: SMTP details,
//! visitor consent flags, and anything else the admin can change without a
//! redeploy.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;

/// A setting key-value pair
#[derive(Debug, Clone)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for settings operations
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Get a single setting by key
    async fn get(&self, key: &str) -> Result<Option<Setting>>;

    /// Get multiple settings by keys
    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>>;

    /// Set a single setting
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Set multiple settings at once
    async fn set_many(&self, settings: &HashMap<String, String>) -> Result<()>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;
}

/// SQLx-based settings repository
pub struct SqlxSettingsRepository {
    pool: DynDatabasePool,
}

impl SqlxSettingsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqlxSettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<Setting>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sqlite(self.pool.as_sqlite().unwrap(), key).await,
            DatabaseDriver::Mysql => get_mysql(self.pool.as_mysql().unwrap(), key).await,
        }
    }

    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        let mut result = HashMap::new();
        for key in keys {
            if let Some(setting) = self.get(key).await? {
                result.insert(setting.key, setting.value);
            }
        }
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => set_sqlite(self.pool.as_sqlite().unwrap(), key, value).await,
            DatabaseDriver::Mysql => set_mysql(self.pool.as_mysql().unwrap(), key, value).await,
        }
    }

    async fn set_many(&self, settings: &HashMap<String, String>) -> Result<()> {
        for (key, value) in settings {
            self.set(key, value).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), key).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), key).await,
        }
    }
}

// SQLite implementations

async fn get_sqlite(pool: &SqlitePool, key: &str) -> Result<Option<Setting>> {
    let row = sqlx::query("SELECT key, value, updated_at FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Setting {
        key: r.get("key"),
        value: r.get("value"),
        updated_at: r.get("updated_at"),
    }))
}

async fn set_sqlite(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

async fn delete_sqlite(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

// MySQL implementations

async fn get_mysql(pool: &MySqlPool, key: &str) -> Result<Option<Setting>> {
    let row = sqlx::query("SELECT `key`, value, updated_at FROM settings WHERE `key` = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| Setting {
        key: r.get("key"),
        value: r.get("value"),
        updated_at: r.get("updated_at"),
    }))
}

async fn set_mysql(pool: &MySqlPool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (`key`, value) VALUES (?, ?)
         ON DUPLICATE KEY UPDATE value = VALUES(value)",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

async fn delete_mysql(pool: &MySqlPool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE `key` = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn set_get_overwrite_delete() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let repo = SqlxSettingsRepository::new(pool);

        assert!(repo.get("smtp_host").await.unwrap().is_none());

        repo.set("smtp_host", "mail.example.co.uk").await.unwrap();
        let setting = repo.get("smtp_host").await.unwrap().unwrap();
        assert_eq!(setting.value, "mail.example.co.uk");

        repo.set("smtp_host", "mail2.example.co.uk").await.unwrap();
        let setting = repo.get("smtp_host").await.unwrap().unwrap();
        assert_eq!(setting.value, "mail2.example.co.uk");

        repo.delete("smtp_host").await.unwrap();
        assert!(repo.get("smtp_host").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_many_skips_missing_keys() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let repo = SqlxSettingsRepository::new(pool);

        repo.set("a", "1").await.unwrap();
        repo.set("b", "2").await.unwrap();

        let map = repo.get_many(&["a", "b", "missing"]).await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
    }
}
