pub mod bookings;
pub mod commission;
pub mod health;
pub mod leads;
pub mod reports;

use axum::http::HeaderMap;
use chrono::{NaiveDate, NaiveTime};

use crate::errors::AppError;
use crate::models::{Actor, ActorRole};

/// The auth layer in front of this service has already verified the caller;
/// it hands identity and role down in plain headers.
pub(crate) fn require_actor(headers: &HeaderMap) -> Result<Actor, AppError> {
    let id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Forbidden("missing actor identity".to_string()))?;

    let role = headers
        .get("x-actor-role")
        .and_then(|v| v.to_str().ok())
        .and_then(ActorRole::parse)
        .ok_or_else(|| AppError::Forbidden("missing or unknown actor role".to_string()))?;

    Ok(Actor {
        id: id.to_string(),
        role,
    })
}

pub(crate) fn parse_date_param(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{field} must be formatted as YYYY-MM-DD")))
}

pub(crate) fn parse_time_param(value: &str, field: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("{field} must be formatted as HH:MM")))
}
