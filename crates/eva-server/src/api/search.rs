//! GET /api/search — geo-proximity vendor search.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eva_db::{VendorFilters, VendorSort};
use eva_geo::{MatchMode, SearchMode};
use eva_search::{MatchedVendor, SearchPage, SearchRequest};

use crate::middleware::RequestId;

use super::{internal_error, normalize_limit, normalize_page, AppState, InternalError};

const DEFAULT_RADIUS_MILES: f64 = 5.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchParams {
    postcode: Option<String>,
    radius: Option<f64>,
    search_mode: Option<String>,
    category: Option<String>,
    price_from: Option<Decimal>,
    price_to: Option<Decimal>,
    rating: Option<f64>,
    culture_tags: Option<String>,
    verified_only: Option<String>,
    sort: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

impl SearchParams {
    fn into_request(self) -> SearchRequest {
        let culture_tags = self
            .culture_tags
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        SearchRequest {
            postcode: self.postcode,
            radius_miles: self.radius.unwrap_or(DEFAULT_RADIUS_MILES),
            mode: self
                .search_mode
                .as_deref()
                .map(SearchMode::from_param)
                .unwrap_or_default(),
            filters: VendorFilters {
                category: self.category.filter(|c| !c.is_empty()),
                price_from: self.price_from,
                price_to: self.price_to,
                min_rating: self.rating,
                culture_tags,
                verified_only: self.verified_only.as_deref() == Some("true"),
            },
            sort: self
                .sort
                .as_deref()
                .map(VendorSort::from_param)
                .unwrap_or_default(),
            page: normalize_page(self.page),
            limit: normalize_limit(self.limit),
        }
    }
}

/// A vendor record as shipped to search consumers, including the distance
/// annotation (null when the search center did not geocode).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProviderItem {
    pub id: Uuid,
    pub business_name: String,
    pub slug: String,
    pub category: String,
    pub city: Option<String>,
    pub starting_price: Option<Decimal>,
    pub rating: Option<f64>,
    pub review_count: i32,
    pub culture_tags: Vec<String>,
    pub is_verified: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_radius_miles: f64,
    pub created_at: DateTime<Utc>,
    pub distance: Option<f64>,
    pub distance_km: Option<f64>,
    pub match_mode: Option<MatchMode>,
}

impl From<MatchedVendor> for ProviderItem {
    fn from(m: MatchedVendor) -> Self {
        let v = m.vendor;
        ProviderItem {
            id: v.public_id,
            business_name: v.business_name,
            slug: v.slug,
            category: v.category,
            city: v.city,
            starting_price: v.starting_price,
            rating: v.rating,
            review_count: v.review_count,
            culture_tags: v.culture_tags,
            is_verified: v.is_verified,
            latitude: v.latitude,
            longitude: v.longitude,
            service_radius_miles: v.service_radius_miles,
            created_at: v.created_at,
            distance: m.distance_miles,
            distance_km: m.distance_km,
            match_mode: m.match_mode,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub search_mode: SearchMode,
    pub geocoded: bool,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub providers: Vec<ProviderItem>,
    pub meta: SearchMeta,
}

impl SearchResponse {
    fn from_page(mode: SearchMode, page: SearchPage) -> Self {
        SearchResponse {
            providers: page.vendors.into_iter().map(ProviderItem::from).collect(),
            meta: SearchMeta {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
                search_mode: mode,
                geocoded: page.geocoded,
                city: page.city,
            },
        }
    }
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, InternalError> {
    let request = params.into_request();

    let page = eva_search::execute_search(
        &state.pool,
        &state.geocoder,
        state.search_fetch_limit,
        &request,
    )
    .await
    .map_err(|e| internal_error(&req_id.0, &e))?;

    Ok(Json(SearchResponse::from_page(request.mode, page)))
}
