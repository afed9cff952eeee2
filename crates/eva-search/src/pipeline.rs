//! The request-to-page search pipeline.
//!
//! Resolve → bounded fetch → distance narrowing → best-effort log →
//! paginate. Distance sorting supersedes the requested sort whenever the
//! search center geocoded.

use eva_db::{DbError, NewSearchLog, VendorFilters, VendorRow, VendorSort};
use eva_geo::{km_to_miles, match_vendor, round_tenth, MatchMode, Point, SearchMode};
use eva_geocode::GeocodeClient;
use sqlx::PgPool;
use thiserror::Error;

use crate::resolver::resolve_postcode;

/// Result-count floor above which a search is considered to have found a
/// liquid market. Recorded on the analytics log only.
pub const LIQUIDITY_THRESHOLD: usize = 8;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Db(#[from] DbError),
}

/// A fully-defaulted, validated search request. The HTTP layer owns parsing
/// and defaulting of raw query parameters.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub postcode: Option<String>,
    pub radius_miles: f64,
    pub mode: SearchMode,
    pub filters: VendorFilters,
    pub sort: VendorSort,
    pub page: i64,
    pub limit: i64,
}

/// A vendor annotated with its computed distance from the search center.
///
/// The distance fields and match mode are `None` when the search ran without
/// a geocoded center — the shape stays stable for consumers either way.
#[derive(Debug, Clone)]
pub struct MatchedVendor {
    pub vendor: VendorRow,
    pub distance_miles: Option<f64>,
    pub distance_km: Option<f64>,
    pub match_mode: Option<MatchMode>,
}

/// One page of search results plus pagination and geocoding metadata.
#[derive(Debug)]
pub struct SearchPage {
    pub vendors: Vec<MatchedVendor>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub geocoded: bool,
    pub city: Option<String>,
}

/// Execute a search end to end.
///
/// The analytics log write (step 4) is fire-and-forget: its `Result` is
/// inspected only to emit a warning, never to fail the request.
///
/// # Errors
///
/// Returns [`SearchError::Db`] if the cache read or the vendor query fails.
/// Geocoding failures do not error; they degrade the search to
/// non-geographic filtering.
pub async fn execute_search(
    pool: &PgPool,
    geocoder: &GeocodeClient,
    fetch_limit: i64,
    request: &SearchRequest,
) -> Result<SearchPage, SearchError> {
    let resolved = match request.postcode.as_deref() {
        Some(postcode) => resolve_postcode(pool, geocoder, postcode).await?,
        None => crate::resolver::ResolvedLocation::default(),
    };
    let center = resolved.point();

    let rows =
        eva_db::search_published_vendors(pool, &request.filters, request.sort, fetch_limit).await?;

    let matched = match center {
        Some(center) => narrow_by_distance(rows, center, request.radius_miles, request.mode),
        None => rows
            .into_iter()
            .map(|vendor| MatchedVendor {
                vendor,
                distance_miles: None,
                distance_km: None,
                match_mode: None,
            })
            .collect(),
    };

    let total = matched.len();
    record_search(pool, request, &resolved, total).await;

    Ok(paginate(
        matched,
        request.page,
        request.limit,
        resolved.is_geocoded(),
        resolved.city,
    ))
}

/// Apply the dual-radius policy to every fetched vendor and sort the
/// survivors ascending by distance.
fn narrow_by_distance(
    rows: Vec<VendorRow>,
    center: Point,
    radius_miles: f64,
    mode: SearchMode,
) -> Vec<MatchedVendor> {
    let mut matched: Vec<(f64, MatchedVendor)> = rows
        .into_iter()
        .filter_map(|vendor| {
            let coords = match (vendor.latitude, vendor.longitude) {
                (Some(lat), Some(lng)) => Some(Point::new(lat, lng)),
                _ => None,
            };
            let hit = match_vendor(
                center,
                coords,
                radius_miles,
                vendor.service_radius_miles,
                mode,
            )?;
            let annotated = MatchedVendor {
                vendor,
                distance_miles: Some(round_tenth(km_to_miles(hit.distance_km))),
                distance_km: Some(round_tenth(hit.distance_km)),
                match_mode: Some(hit.match_mode),
            };
            Some((hit.distance_km, annotated))
        })
        .collect();

    // Sort on the exact distance, not the rounded display value.
    matched.sort_by(|a, b| a.0.total_cmp(&b.0));
    matched.into_iter().map(|(_, v)| v).collect()
}

/// Best-effort analytics write. Failures are logged and swallowed.
async fn record_search(
    pool: &PgPool,
    request: &SearchRequest,
    resolved: &crate::resolver::ResolvedLocation,
    result_count: usize,
) {
    let postcode = request
        .postcode
        .as_deref()
        .map(crate::resolver::normalize_postcode)
        .filter(|key| !key.is_empty());

    let log = NewSearchLog {
        postcode,
        latitude: resolved.latitude,
        longitude: resolved.longitude,
        radius_miles: request.radius_miles,
        search_mode: request.mode.as_str().to_string(),
        category: request.filters.category.clone(),
        price_from: request.filters.price_from,
        price_to: request.filters.price_to,
        min_rating: request.filters.min_rating,
        culture_tags: request.filters.culture_tags.clone(),
        verified_only: request.filters.verified_only,
        result_count: i32::try_from(result_count).unwrap_or(i32::MAX),
        met_liquidity_threshold: result_count >= LIQUIDITY_THRESHOLD,
    };

    if let Err(e) = eva_db::insert_search_log(pool, &log).await {
        tracing::warn!(error = %e, "search log write failed; response unaffected");
    }
}

fn paginate(
    matched: Vec<MatchedVendor>,
    page: i64,
    limit: i64,
    geocoded: bool,
    city: Option<String>,
) -> SearchPage {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = matched.len() as i64;
    let total_pages = (total as u64).div_ceil(limit as u64) as i64;

    let offset = usize::try_from((page - 1) * limit).unwrap_or(usize::MAX);
    let vendors: Vec<MatchedVendor> = matched
        .into_iter()
        .skip(offset)
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    SearchPage {
        vendors,
        page,
        limit,
        total,
        total_pages,
        geocoded,
        city,
    }
}
