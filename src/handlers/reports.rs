use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::{parse_date_param, require_actor};
use crate::services::reporting::{
    self, CommissionsDue, ProjectionReport, RevenueReport,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub owner_id: Option<String>,
}

fn parse_range(query: &RangeQuery) -> Result<(Option<chrono::NaiveDate>, Option<chrono::NaiveDate>), AppError> {
    let from = match query.from.as_deref() {
        Some(raw) => Some(parse_date_param(raw, "from")?),
        None => None,
    };
    let to = match query.to.as_deref() {
        Some(raw) => Some(parse_date_param(raw, "to")?),
        None => None,
    };
    Ok((from, to))
}

// GET /api/reports/revenue
pub async fn revenue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RevenueReport>, AppError> {
    let actor = require_actor(&headers)?;
    let (from, to) = parse_range(&query)?;
    let report =
        reporting::revenue_report(&state, &actor, query.owner_id.clone(), from, to).await?;
    Ok(Json(report))
}

// GET /api/reports/pending-commissions
pub async fn pending_commissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CommissionsDue>, AppError> {
    let actor = require_actor(&headers)?;
    let (from, to) = parse_range(&query)?;
    let due = reporting::pending_commissions(&state, &actor, from, to).await?;
    Ok(Json(due))
}

// GET /api/reports/projection
#[derive(Deserialize)]
pub struct ProjectionQuery {
    pub months: Option<u32>,
    pub owner_id: Option<String>,
}

pub async fn projection(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ProjectionQuery>,
) -> Result<Json<ProjectionReport>, AppError> {
    let actor = require_actor(&headers)?;
    let report = reporting::projection(&state, &actor, query.owner_id, query.months).await?;
    Ok(Json(report))
}
