//! The relational backend: two tables behind a `sqlx::PgPool`, with
//! transactional batch updates and retry-wrapped connection handling.
//!
//! Uses the usual `CREATE TABLE IF NOT EXISTS` + `INSERT ... ON CONFLICT
//! DO UPDATE` idiom for a Postgres-backed key/value store (see
//! DESIGN.md for where this dependency comes from).

use super::{MetricStore, StoreError, StoreSnapshot};
use async_trait::async_trait;
use metrics_core::retry::{classify_sqlx, with_retry, RetryPolicy};
use metrics_core::wire::Metric;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

pub struct RelationalStore {
    pool: PgPool,
    retry_policy: RetryPolicy,
}

impl RelationalStore {
    /// Connect to `dsn`, creating the `gauges`/`counters` tables if they
    /// don't already exist.
    pub async fn connect(dsn: &str, retry_policy: RetryPolicy) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(dsn)
            .await
            .map_err(StoreError::Relational)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS gauges (
                name TEXT PRIMARY KEY,
                value DOUBLE PRECISION NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&pool)
        .await
        .map_err(StoreError::Relational)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS counters (
                name TEXT PRIMARY KEY,
                value BIGINT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&pool)
        .await
        .map_err(StoreError::Relational)?;

        Ok(Self { pool, retry_policy })
    }

    async fn retrying<F, Fut, T>(&self, action: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, sqlx::Error>>,
    {
        with_retry(&self.retry_policy, classify_sqlx, action)
            .await
            .map_err(StoreError::Relational)
    }
}

#[async_trait]
impl MetricStore for RelationalStore {
    async fn update_gauge(&self, id: &str, value: f64) -> Result<f64, StoreError> {
        self.retrying(|| async {
            sqlx::query(
                "INSERT INTO gauges (name, value, updated_at) VALUES ($1, $2, now())
                 ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
            )
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await
        })
        .await?;
        Ok(value)
    }

    async fn update_counter(&self, id: &str, delta: i64) -> Result<i64, StoreError> {
        self.retrying(|| async {
            let row = sqlx::query(
                "INSERT INTO counters (name, value, updated_at) VALUES ($1, $2, now())
                 ON CONFLICT (name) DO UPDATE
                 SET value = counters.value + EXCLUDED.value, updated_at = now()
                 RETURNING value",
            )
            .bind(id)
            .bind(delta)
            .fetch_one(&self.pool)
            .await?;
            Ok::<i64, sqlx::Error>(row.get::<i64, _>("value"))
        })
        .await
    }

    async fn get_gauge(&self, id: &str) -> Result<Option<f64>, StoreError> {
        let row = self
            .retrying(|| async {
                sqlx::query("SELECT value FROM gauges WHERE name = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            })
            .await?;
        Ok(row.map(|r| r.get::<f64, _>("value")))
    }

    async fn get_counter(&self, id: &str) -> Result<Option<i64>, StoreError> {
        let row = self
            .retrying(|| async {
                sqlx::query("SELECT value FROM counters WHERE name = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            })
            .await?;
        Ok(row.map(|r| r.get::<i64, _>("value")))
    }

    async fn get_all(&self) -> Result<StoreSnapshot, StoreError> {
        let gauge_rows = self
            .retrying(|| async { sqlx::query("SELECT name, value FROM gauges").fetch_all(&self.pool).await })
            .await?;
        let counter_rows = self
            .retrying(|| async { sqlx::query("SELECT name, value FROM counters").fetch_all(&self.pool).await })
            .await?;

        let gauges: HashMap<String, f64> = gauge_rows
            .into_iter()
            .map(|r| (r.get::<String, _>("name"), r.get::<f64, _>("value")))
            .collect();
        let counters: HashMap<String, i64> = counter_rows
            .into_iter()
            .map(|r| (r.get::<String, _>("name"), r.get::<i64, _>("value")))
            .collect();

        Ok(StoreSnapshot { gauges, counters })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.retrying(|| async { sqlx::query("SELECT 1").execute(&self.pool).await })
            .await?;
        Ok(())
    }

    /// Apply the whole batch inside one transaction — all-or-nothing. A
    /// failure partway through rolls back every write the batch made so
    /// far, per the all-or-nothing contract for relational batch updates.
    async fn apply_batch(&self, metrics: &[Metric]) -> Result<Vec<Metric>, StoreError> {
        use metrics_core::wire::MetricKind;

        let mut tx = self.pool.begin().await.map_err(StoreError::Relational)?;
        let mut out = Vec::with_capacity(metrics.len());

        for metric in metrics {
            match metric.kind() {
                MetricKind::Gauge => {
                    let value = metric.value().unwrap_or(0.0);
                    sqlx::query(
                        "INSERT INTO gauges (name, value, updated_at) VALUES ($1, $2, now())
                         ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
                    )
                    .bind(metric.id())
                    .bind(value)
                    .execute(&mut *tx)
                    .await
                    .map_err(StoreError::Relational)?;
                    out.push(metric.clone().with_gauge_value(value));
                }
                MetricKind::Counter => {
                    let delta = metric.delta().unwrap_or(0);
                    let row = sqlx::query(
                        "INSERT INTO counters (name, value, updated_at) VALUES ($1, $2, now())
                         ON CONFLICT (name) DO UPDATE
                         SET value = counters.value + EXCLUDED.value, updated_at = now()
                         RETURNING value",
                    )
                    .bind(metric.id())
                    .bind(delta)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(StoreError::Relational)?;
                    let total: i64 = row.get("value");
                    out.push(metric.clone().with_counter_total(total));
                }
            }
        }

        tx.commit().await.map_err(StoreError::Relational)?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "relational_tests.rs"]
mod tests;
