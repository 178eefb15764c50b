use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::require_actor;
use crate::models::ActorRole;
use crate::services::commission::{self, CommissionBreakdown};
use crate::state::AppState;

// POST /api/commission/quote
#[derive(Deserialize)]
pub struct QuoteRequest {
    pub gross_amount: Decimal,
    pub commission_rate: Option<Decimal>,
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<CommissionBreakdown>, AppError> {
    let actor = require_actor(&headers)?;
    if actor.role == ActorRole::Client {
        return Err(AppError::Forbidden(
            "only providers and admins may request quotes".to_string(),
        ));
    }

    if req.gross_amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "gross amount must be greater than zero".to_string(),
        ));
    }
    if let Some(rate) = req.commission_rate {
        if !commission::rate_in_range(rate) {
            return Err(AppError::Validation(
                "commission rate must be between 0 and 100".to_string(),
            ));
        }
    }

    let breakdown = commission::compute(
        req.gross_amount,
        req.commission_rate,
        state.config.commission_basic_rate,
        state.config.commission_min_fee,
    );
    Ok(Json(breakdown))
}

// GET /api/commission/config
#[derive(Serialize)]
pub struct CommissionConfigResponse {
    basic_rate: Decimal,
    min_fee: Decimal,
    currency: String,
}

pub async fn get_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CommissionConfigResponse>, AppError> {
    let actor = require_actor(&headers)?;
    if !actor.is_admin() {
        return Err(AppError::Forbidden(
            "only admins may view commission configuration".to_string(),
        ));
    }

    Ok(Json(CommissionConfigResponse {
        basic_rate: state.config.commission_basic_rate,
        min_fee: state.config.commission_min_fee,
        currency: state.config.currency.clone(),
    }))
}
