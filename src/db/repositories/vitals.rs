//! Core Web Vitals repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::VitalsReport;

/// One metric's raw aggregate row
#[derive(Debug, Clone)]
pub struct MetricAggregate {
    pub metric: String,
    pub samples: i64,
    pub latest_at: Option<DateTime<Utc>>,
}

/// Vitals repository trait
#[async_trait]
pub trait VitalsRepository: Send + Sync {
    /// Store one reported metric sample
    async fn record(&self, report: &VitalsReport) -> Result<()>;

    /// Sample counts and latest timestamps per metric
    async fn aggregates(&self) -> Result<Vec<MetricAggregate>>;

    /// All values for one metric, ascending
    async fn metric_values(&self, metric: &str) -> Result<Vec<f64>>;
}

/// SQLx-based vitals repository
pub struct SqlxVitalsRepository {
    pool: DynDatabasePool,
}

impl SqlxVitalsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VitalsRepository for SqlxVitalsRepository {
    async fn record(&self, report: &VitalsReport) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => record_sqlite(self.pool.as_sqlite().unwrap(), report).await,
            DatabaseDriver::Mysql => record_mysql(self.pool.as_mysql().unwrap(), report).await,
        }
    }

    async fn aggregates(&self) -> Result<Vec<MetricAggregate>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => aggregates_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => aggregates_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn metric_values(&self, metric: &str) -> Result<Vec<f64>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                metric_values_sqlite(self.pool.as_sqlite().unwrap(), metric).await
            }
            DatabaseDriver::Mysql => {
                metric_values_mysql(self.pool.as_mysql().unwrap(), metric).await
            }
        }
    }
}

// SQLite implementations

async fn record_sqlite(pool: &SqlitePool, report: &VitalsReport) -> Result<()> {
    sqlx::query("INSERT INTO web_vitals (metric, value, page) VALUES (?, ?, ?)")
        .bind(&report.metric)
        .bind(report.value)
        .bind(&report.page)
        .execute(pool)
        .await?;
    Ok(())
}

async fn aggregates_sqlite(pool: &SqlitePool) -> Result<Vec<MetricAggregate>> {
    let rows = sqlx::query(
        "SELECT metric, COUNT(*) AS samples, MAX(created_at) AS latest_at
         FROM web_vitals GROUP BY metric ORDER BY metric",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| MetricAggregate {
            metric: row.get("metric"),
            samples: row.get("samples"),
            latest_at: row.get("latest_at"),
        })
        .collect())
}

async fn metric_values_sqlite(pool: &SqlitePool, metric: &str) -> Result<Vec<f64>> {
    let rows = sqlx::query("SELECT value FROM web_vitals WHERE metric = ? ORDER BY value")
        .bind(metric)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|row| row.get("value")).collect())
}

// MySQL implementations

async fn record_mysql(pool: &MySqlPool, report: &VitalsReport) -> Result<()> {
    sqlx::query("INSERT INTO web_vitals (metric, value, page) VALUES (?, ?, ?)")
        .bind(&report.metric)
        .bind(report.value)
        .bind(&report.page)
        .execute(pool)
        .await?;
    Ok(())
}

async fn aggregates_mysql(pool: &MySqlPool) -> Result<Vec<MetricAggregate>> {
    let rows = sqlx::query(
        "SELECT metric, COUNT(*) AS samples, MAX(created_at) AS latest_at
         FROM web_vitals GROUP BY metric ORDER BY metric",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| MetricAggregate {
            metric: row.get("metric"),
            samples: row.get("samples"),
            latest_at: row.get("latest_at"),
        })
        .collect())
}

async fn metric_values_mysql(pool: &MySqlPool, metric: &str) -> Result<Vec<f64>> {
    let rows = sqlx::query("SELECT value FROM web_vitals WHERE metric = ? ORDER BY value")
        .bind(metric)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|row| row.get("value")).collect())
}
