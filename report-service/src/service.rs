//! Report query execution.
//!
//! Runs the fixed report SQL with the caller's pagination bounds and
//! marshals the rows into JSON. The SQL text itself is opaque external
//! data; the service only supplies the two positional parameters and
//! consumes whatever columns come back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use common::errors::{AppError, AppResult};
use common::models::ReportRow;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

use crate::pool_manager::PoolManager;

/// The fixed report query. `$1` is the row limit, `$2` the offset.
pub const REPORT_SQL: &str = include_str!("../sql/report.sql");

/// Executes the report query.
#[async_trait]
pub trait ReportRunner: Send + Sync {
    /// Runs the report with the given pagination bounds.
    async fn run_report(&self, limit: i64, offset: i64) -> AppResult<Vec<ReportRow>>;
}

/// Pool-backed report executor.
pub struct ReportService {
    pool_manager: Arc<PoolManager>,
}

impl ReportService {
    pub fn new(pool_manager: Arc<PoolManager>) -> Self {
        Self { pool_manager }
    }
}

#[async_trait]
impl ReportRunner for ReportService {
    async fn run_report(&self, limit: i64, offset: i64) -> AppResult<Vec<ReportRow>> {
        // Fails fast when the pool never initialized; no acquisition is
        // attempted against a degraded manager.
        let mut conn = self.pool_manager.acquire().await?;

        let started = std::time::Instant::now();

        // All rows are materialized before the lease ends. The connection
        // handle drops on both the error and the success path, so the
        // lease always returns to the pool.
        let rows = sqlx::query(REPORT_SQL)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "report query failed");
                AppError::QueryExecution(e.to_string())
            })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            rows = rows.len(),
            limit,
            offset,
            elapsed_ms,
            "report query completed"
        );

        rows.iter().map(row_to_json).collect()
    }
}

/// Converts one row into an ordered column-to-JSON-value map.
fn row_to_json(row: &PgRow) -> AppResult<ReportRow> {
    let mut out = ReportRow::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let value = cell_to_json(row, idx, col.type_info().name()).map_err(|e| {
            AppError::QueryExecution(format!("column `{}`: {}", col.name(), e))
        })?;
        out.insert(col.name().to_string(), value);
    }
    Ok(out)
}

/// Decodes one cell, driven by the Postgres type name.
///
/// Unknown types fall back to a text decode and finally to null.
fn cell_to_json(row: &PgRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOL" => row
            .try_get::<Option<bool>, _>(idx)?
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)?
            .map(|v| Value::from(i64::from(v)))
            .unwrap_or(Value::Null),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)?
            .map(|v| Value::from(i64::from(v)))
            .unwrap_or(Value::Null),
        "INT8" => row
            .try_get::<Option<i64>, _>(idx)?
            .map(Value::from)
            .unwrap_or(Value::Null),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(f64::from)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(idx)?
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(idx)?
            .map(decimal_to_json)
            .unwrap_or(Value::Null),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(idx)?
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|dt| Value::String(dt.to_rfc3339()))
            .unwrap_or(Value::Null),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => row
            .try_get::<Option<String>, _>(idx)?
            .map(Value::String)
            .unwrap_or(Value::Null),
        _ => match row.try_get::<Option<String>, _>(idx) {
            Ok(v) => v.map(Value::String).unwrap_or(Value::Null),
            Err(_) => Value::Null,
        },
    };
    Ok(value)
}

/// Decimals become JSON numbers when representable, strings otherwise.
fn decimal_to_json(d: Decimal) -> Value {
    d.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(d.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn report_sql_is_parameterized_and_read_only() {
        assert!(REPORT_SQL.contains("LIMIT $1 OFFSET $2"));
        assert!(REPORT_SQL.trim_start().to_uppercase().starts_with("SELECT"));
    }

    #[test]
    fn report_sql_orders_by_unit_then_fund() {
        let upper = REPORT_SQL.to_uppercase();
        let order_at = upper.find("ORDER BY").expect("query has an ORDER BY");
        assert!(upper[order_at..].contains("NM_UNIDADE"));
        assert!(upper[order_at..].contains("NM_FUNDO"));
    }

    #[test]
    fn decimal_converts_to_json_number() {
        let value = decimal_to_json(Decimal::from_str("1234.56").unwrap());
        assert_eq!(value, serde_json::json!(1234.56));
    }

    #[test]
    fn zero_decimal_converts_to_zero() {
        assert_eq!(decimal_to_json(Decimal::ZERO), serde_json::json!(0.0));
    }
}
