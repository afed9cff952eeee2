//! Database operations for the `vendors` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `vendors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VendorRow {
    pub id: i64,
    pub public_id: Uuid,
    pub business_name: String,
    pub slug: String,
    pub category: String,
    pub city: Option<String>,
    pub starting_price: Option<Decimal>,
    pub rating: Option<f64>,
    pub review_count: i32,
    pub culture_tags: Vec<String>,
    pub is_verified: bool,
    pub is_published: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_radius_miles: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Filters and ordering
// ---------------------------------------------------------------------------

/// Non-geographic search filters. Distance narrowing happens in memory after
/// the fetch, so this query only scopes the candidate set.
#[derive(Debug, Clone, Default)]
pub struct VendorFilters {
    pub category: Option<String>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
    pub min_rating: Option<f64>,
    pub culture_tags: Vec<String>,
    pub verified_only: bool,
}

/// Pre-filter query ordering. When the search center geocodes, distance
/// sorting supersedes this in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorSort {
    Rating,
    Price,
    Newest,
}

impl Default for VendorSort {
    fn default() -> Self {
        VendorSort::Newest
    }
}

impl VendorSort {
    /// Parse a `sort` query value. Unrecognized values fall back to newest.
    #[must_use]
    pub fn from_param(s: &str) -> Self {
        match s {
            "rating" => VendorSort::Rating,
            "price" => VendorSort::Price,
            _ => VendorSort::Newest,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            VendorSort::Rating => "rating DESC NULLS LAST, created_at DESC",
            VendorSort::Price => "starting_price ASC NULLS LAST, created_at DESC",
            VendorSort::Newest => "created_at DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const VENDOR_COLUMNS: &str = "id, public_id, business_name, slug, category, city, starting_price, \
     rating, review_count, culture_tags, is_verified, is_published, latitude, longitude, \
     service_radius_miles, created_at, updated_at";

/// Fetch published vendors matching the non-geographic filters, bounded by
/// `fetch_limit` rows.
///
/// The bound exists because distance narrowing happens in memory after this
/// query; callers fetch well more than one page's worth and paginate later.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_published_vendors(
    pool: &PgPool,
    filters: &VendorFilters,
    sort: VendorSort,
    fetch_limit: i64,
) -> Result<Vec<VendorRow>, DbError> {
    let sql = format!(
        "SELECT {VENDOR_COLUMNS} \
         FROM vendors \
         WHERE is_published = TRUE \
           AND ($1::text IS NULL OR category = $1) \
           AND ($2::numeric IS NULL OR starting_price >= $2) \
           AND ($3::numeric IS NULL OR starting_price <= $3) \
           AND ($4::float8 IS NULL OR rating >= $4) \
           AND (cardinality($5::text[]) = 0 OR culture_tags && $5) \
           AND (NOT $6::bool OR is_verified) \
         ORDER BY {} \
         LIMIT $7",
        sort.order_clause()
    );

    let rows = sqlx::query_as::<_, VendorRow>(&sql)
        .bind(filters.category.as_deref())
        .bind(filters.price_from)
        .bind(filters.price_to)
        .bind(filters.min_rating)
        .bind(&filters.culture_tags)
        .bind(filters.verified_only)
        .bind(fetch_limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
