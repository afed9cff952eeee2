//! GET /api/analytics/liquidity — market-liquidity report over the search log.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{internal_error, AppState, InternalError};

const DEFAULT_WINDOW_DAYS: i32 = 30;
const DEFAULT_ROW_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub(super) struct LiquidityParams {
    days: Option<i32>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LiquidityItem {
    pub postcode: String,
    pub searches: i64,
    pub avg_result_count: f64,
    pub liquid_count: i64,
    pub last_searched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct LiquidityMeta {
    pub days: i32,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct LiquidityResponse {
    pub postcodes: Vec<LiquidityItem>,
    pub meta: LiquidityMeta,
}

pub(super) async fn liquidity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<LiquidityParams>,
) -> Result<Json<LiquidityResponse>, InternalError> {
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, 365);
    let limit = params.limit.unwrap_or(DEFAULT_ROW_LIMIT).clamp(1, 200);

    let rows = eva_db::liquidity_summary(&state.pool, days, limit)
        .await
        .map_err(|e| internal_error(&req_id.0, &e))?;

    let postcodes = rows
        .into_iter()
        .map(|row| LiquidityItem {
            postcode: row.postcode,
            searches: row.search_count,
            avg_result_count: row.avg_result_count,
            liquid_count: row.liquid_count,
            last_searched_at: row.last_searched_at,
        })
        .collect();

    Ok(Json(LiquidityResponse {
        postcodes,
        meta: LiquidityMeta { days, limit },
    }))
}
