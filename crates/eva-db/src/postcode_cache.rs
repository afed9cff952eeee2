//! Read/insert operations for the `postcode_cache` table.
//!
//! The cache is append-only: entries are created on first miss and never
//! updated or expired here. Keys are normalized postcodes (uppercased,
//! whitespace stripped) — normalization is the resolver's job, not this
//! module's.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `postcode_cache` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostcodeCacheRow {
    pub id: i64,
    pub postcode: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Look up a cache entry by normalized postcode key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_postcode(pool: &PgPool, key: &str) -> Result<Option<PostcodeCacheRow>, DbError> {
    let row = sqlx::query_as::<_, PostcodeCacheRow>(
        "SELECT id, postcode, latitude, longitude, city, created_at \
         FROM postcode_cache \
         WHERE postcode = $1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a cache entry for a normalized postcode key.
///
/// Uses `ON CONFLICT DO NOTHING`: two requests racing to cache the same
/// first-time postcode both succeed, and exactly one row persists. Returns
/// `true` if this call inserted the row, `false` if it lost the race.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails for any reason other than a
/// duplicate key.
pub async fn insert_postcode(
    pool: &PgPool,
    key: &str,
    latitude: f64,
    longitude: f64,
    city: Option<&str>,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO postcode_cache (postcode, latitude, longitude, city) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (postcode) DO NOTHING",
    )
    .bind(key)
    .bind(latitude)
    .bind(longitude)
    .bind(city)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
