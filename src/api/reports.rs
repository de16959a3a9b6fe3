//! Reporting endpoints (all admin)

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::db::reports::{RankingEntry, Stats};
use crate::error::ApiError;
use crate::state::AppState;
use crate::util;

use super::ApiResult;

#[derive(Deserialize)]
pub struct RankingQuery {
    pub month: Option<String>,
}

#[derive(Serialize)]
pub struct RankingResponse {
    pub month: String,
    pub ranking: Vec<RankingEntry>,
}

/// GET /api/ranking?month=YYYY-M — defaults to the current month
pub async fn monthly_ranking(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> ApiResult<RankingResponse> {
    let (year, month) = match query.month.as_deref() {
        Some(raw) => util::parse_month(raw)
            .ok_or_else(|| ApiError::Validation("Invalid month, expected YYYY-M".into()))?,
        None => util::current_month(),
    };

    let ranking = db::reports::monthly_ranking(&state.pool, year, month).await?;
    Ok(Json(RankingResponse {
        month: util::format_month(year, month),
        ranking,
    }))
}

/// GET /api/stats — dashboard aggregates
pub async fn stats(State(state): State<AppState>) -> ApiResult<Stats> {
    let stats = db::reports::stats(&state.pool).await?;
    Ok(Json(stats))
}
