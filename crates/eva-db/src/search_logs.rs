//! Write and reporting operations for the `search_logs` table.
//!
//! The write side is called best-effort from the search pipeline — the
//! caller discards the `Result` after logging a warning. The read side feeds
//! the market-liquidity report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// One analytics record for an executed search.
#[derive(Debug, Clone)]
pub struct NewSearchLog {
    pub postcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_miles: f64,
    pub search_mode: String,
    pub category: Option<String>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
    pub min_rating: Option<f64>,
    pub culture_tags: Vec<String>,
    pub verified_only: bool,
    pub result_count: i32,
    pub met_liquidity_threshold: bool,
}

/// Insert one search log row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails. Callers on the search path
/// are expected to swallow this error.
pub async fn insert_search_log(pool: &PgPool, log: &NewSearchLog) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO search_logs \
             (postcode, latitude, longitude, radius_miles, search_mode, category, \
              price_from, price_to, min_rating, culture_tags, verified_only, \
              result_count, met_liquidity_threshold) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(log.postcode.as_deref())
    .bind(log.latitude)
    .bind(log.longitude)
    .bind(log.radius_miles)
    .bind(&log.search_mode)
    .bind(log.category.as_deref())
    .bind(log.price_from)
    .bind(log.price_to)
    .bind(log.min_rating)
    .bind(&log.culture_tags)
    .bind(log.verified_only)
    .bind(log.result_count)
    .bind(log.met_liquidity_threshold)
    .execute(pool)
    .await?;

    Ok(())
}

/// Per-postcode aggregate over the search log.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LiquidityRow {
    pub postcode: String,
    pub search_count: i64,
    pub avg_result_count: f64,
    pub liquid_count: i64,
    pub last_searched_at: DateTime<Utc>,
}

/// Aggregate search volume per postcode over the trailing `days` window.
///
/// Rows without a postcode (free-text or empty searches) are excluded; they
/// carry no location signal for liquidity reporting.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn liquidity_summary(
    pool: &PgPool,
    days: i32,
    limit: i64,
) -> Result<Vec<LiquidityRow>, DbError> {
    let rows = sqlx::query_as::<_, LiquidityRow>(
        "SELECT postcode, \
                COUNT(*) AS search_count, \
                AVG(result_count)::float8 AS avg_result_count, \
                COUNT(*) FILTER (WHERE met_liquidity_threshold) AS liquid_count, \
                MAX(created_at) AS last_searched_at \
         FROM search_logs \
         WHERE postcode IS NOT NULL \
           AND created_at >= NOW() - make_interval(days => $1) \
         GROUP BY postcode \
         ORDER BY search_count DESC, postcode \
         LIMIT $2",
    )
    .bind(days)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
