//! Call-tracking repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CallEvent, LocationCallStats, RecordCallInput};

/// Call event repository trait
#[async_trait]
pub trait CallEventRepository: Send + Sync {
    /// Record one call-button click
    async fn record(&self, input: &RecordCallInput) -> Result<CallEvent>;

    /// Aggregate click counts per location
    async fn location_stats(&self) -> Result<Vec<LocationCallStats>>;

    /// Total number of recorded clicks
    async fn total(&self) -> Result<i64>;

    /// Most recent clicks, newest first
    async fn recent(&self, limit: u32) -> Result<Vec<CallEvent>>;
}

/// SQLx-based call event repository
pub struct SqlxCallEventRepository {
    pool: DynDatabasePool,
}

impl SqlxCallEventRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CallEventRepository for SqlxCallEventRepository {
    async fn record(&self, input: &RecordCallInput) -> Result<CallEvent> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => record_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => record_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn location_stats(&self) -> Result<Vec<LocationCallStats>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => location_stats_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => location_stats_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn total(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                Ok(sqlx::query_scalar("SELECT COUNT(*) FROM call_events")
                    .fetch_one(self.pool.as_sqlite().unwrap())
                    .await?)
            }
            DatabaseDriver::Mysql => {
                Ok(sqlx::query_scalar("SELECT COUNT(*) FROM call_events")
                    .fetch_one(self.pool.as_mysql().unwrap())
                    .await?)
            }
        }
    }

    async fn recent(&self, limit: u32) -> Result<Vec<CallEvent>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => recent_sqlite(self.pool.as_sqlite().unwrap(), limit).await,
            DatabaseDriver::Mysql => recent_mysql(self.pool.as_mysql().unwrap(), limit).await,
        }
    }
}

// SQLite implementations

async fn record_sqlite(pool: &SqlitePool, input: &RecordCallInput) -> Result<CallEvent> {
    let result = sqlx::query("INSERT INTO call_events (location, source_page) VALUES (?, ?)")
        .bind(&input.location)
        .bind(&input.source_page)
        .execute(pool)
        .await?;

    let row = sqlx::query("SELECT * FROM call_events WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

    Ok(CallEvent {
        id: row.get("id"),
        location: row.get("location"),
        source_page: row.get("source_page"),
        created_at: row.get("created_at"),
    })
}

async fn location_stats_sqlite(pool: &SqlitePool) -> Result<Vec<LocationCallStats>> {
    let rows = sqlx::query(
        "SELECT location, COUNT(*) AS total_calls, MAX(created_at) AS last_call_at
         FROM call_events GROUP BY location ORDER BY total_calls DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| LocationCallStats {
            location: row.get("location"),
            total_calls: row.get("total_calls"),
            last_call_at: row.get("last_call_at"),
        })
        .collect())
}

async fn recent_sqlite(pool: &SqlitePool, limit: u32) -> Result<Vec<CallEvent>> {
    let rows = sqlx::query("SELECT * FROM call_events ORDER BY created_at DESC, id DESC LIMIT ?")
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| CallEvent {
            id: row.get("id"),
            location: row.get("location"),
            source_page: row.get("source_page"),
            created_at: row.get("created_at"),
        })
        .collect())
}

// MySQL implementations

async fn record_mysql(pool: &MySqlPool, input: &RecordCallInput) -> Result<CallEvent> {
    let result = sqlx::query("INSERT INTO call_events (location, source_page) VALUES (?, ?)")
        .bind(&input.location)
        .bind(&input.source_page)
        .execute(pool)
        .await?;

    let row = sqlx::query("SELECT * FROM call_events WHERE id = ?")
        .bind(result.last_insert_id() as i64)
        .fetch_one(pool)
        .await?;

    Ok(CallEvent {
        id: row.get("id"),
        location: row.get("location"),
        source_page: row.get("source_page"),
        created_at: row.get("created_at"),
    })
}

async fn location_stats_mysql(pool: &MySqlPool) -> Result<Vec<LocationCallStats>> {
    let rows = sqlx::query(
        "SELECT location, COUNT(*) AS total_calls, MAX(created_at) AS last_call_at
         FROM call_events GROUP BY location ORDER BY total_calls DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| LocationCallStats {
            location: row.get("location"),
            total_calls: row.get("total_calls"),
            last_call_at: row.get("last_call_at"),
        })
        .collect())
}

async fn recent_mysql(pool: &MySqlPool, limit: u32) -> Result<Vec<CallEvent>> {
    let rows = sqlx::query("SELECT * FROM call_events ORDER BY created_at DESC, id DESC LIMIT ?")
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| CallEvent {
            id: row.get("id"),
            location: row.get("location"),
            source_page: row.get("source_page"),
            created_at: row.get("created_at"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn repo() -> SqlxCallEventRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxCallEventRepository::new(pool)
    }

    #[tokio::test]
    async fn record_and_aggregate() {
        let repo = repo().await;
        for _ in 0..3 {
            repo.record(&RecordCallInput {
                location: "manchester".into(),
                source_page: "/areas/manchester".into(),
            })
            .await
            .unwrap();
        }
        repo.record(&RecordCallInput {
            location: "leeds".into(),
            source_page: "/areas/leeds".into(),
        })
        .await
        .unwrap();

        assert_eq!(repo.total().await.unwrap(), 4);

        let stats = repo.location_stats().await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].location, "manchester");
        assert_eq!(stats[0].total_calls, 3);
        assert!(stats[0].last_call_at.is_some());
    }

    #[tokio::test]
    async fn recent_respects_limit() {
        let repo = repo().await;
        for i in 0..5 {
            repo.record(&RecordCallInput {
                location: format!("loc-{}", i),
                source_page: String::new(),
            })
            .await
            .unwrap();
        }

        let recent = repo.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].location, "loc-4");
    }
}
