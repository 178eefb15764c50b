use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::queries::BookingFilters;
use crate::errors::AppError;
use crate::handlers::{parse_date_param, parse_time_param, require_actor};
use crate::models::{Booking, BookingStatus, PaymentStatus};
use crate::services::availability::DayAvailability;
use crate::services::bookings::{self, BookingStatusUpdate, NewBookingData, PaymentReceipt};
use crate::services::payments::PaymentDetails;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    lead_id: String,
    venue_id: String,
    event_name: String,
    event_type: String,
    event_date: String,
    start_time: String,
    end_time: String,
    guest_count: i32,
    client_name: String,
    client_email: String,
    client_phone: String,
    gross_amount: Decimal,
    commission_rate: Decimal,
    commission_amount: Decimal,
    venue_payout: Decimal,
    currency: String,
    status: String,
    payment_status: String,
    special_requirements: Option<String>,
    internal_notes: Option<String>,
    cancelled_at: Option<String>,
    cancellation_reason: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id,
            lead_id: booking.lead_id,
            venue_id: booking.venue_id,
            event_name: booking.event_name,
            event_type: booking.event_type,
            event_date: booking.event_date.format("%Y-%m-%d").to_string(),
            start_time: booking.start_time.format("%H:%M").to_string(),
            end_time: booking.end_time.format("%H:%M").to_string(),
            guest_count: booking.guest_count,
            client_name: booking.client_name,
            client_email: booking.client_email,
            client_phone: booking.client_phone,
            gross_amount: booking.gross_amount,
            commission_rate: booking.commission_rate,
            commission_amount: booking.commission_amount,
            venue_payout: booking.venue_payout,
            currency: booking.currency,
            status: booking.status.as_str().to_string(),
            payment_status: booking.payment_status.as_str().to_string(),
            special_requirements: booking.special_requirements,
            internal_notes: booking.internal_notes,
            cancelled_at: booking
                .cancelled_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            cancellation_reason: booking.cancellation_reason,
            created_at: booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/bookings/from-lead/:lead_id
#[derive(Deserialize)]
pub struct ConvertLeadRequest {
    pub event_name: Option<String>,
    pub event_date: String,
    pub start_time: String,
    pub end_time: String,
    pub guest_count: Option<i32>,
    pub gross_amount: Decimal,
    pub commission_rate: Option<Decimal>,
    pub special_requirements: Option<String>,
}

pub async fn convert_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<ConvertLeadRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let actor = require_actor(&headers)?;
    let data = NewBookingData {
        event_name: req.event_name,
        event_date: parse_date_param(&req.event_date, "event_date")?,
        start_time: parse_time_param(&req.start_time, "start_time")?,
        end_time: parse_time_param(&req.end_time, "end_time")?,
        guest_count: req.guest_count,
        gross_amount: req.gross_amount,
        commission_rate: req.commission_rate,
        special_requirements: req.special_requirements,
    };

    let booking = bookings::convert_lead(&state, &lead_id, data, &actor).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = bookings::get_booking(&state, &id).await?;
    Ok(Json(booking.into()))
}

// PATCH /api/bookings/:id/status
#[derive(Deserialize)]
pub struct BookingStatusRequest {
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub internal_notes: Option<String>,
}

pub async fn set_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<BookingStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let booking = bookings::set_booking_status(
        &state,
        &id,
        &req.status,
        &actor,
        BookingStatusUpdate {
            cancellation_reason: req.cancellation_reason,
            internal_notes: req.internal_notes,
        },
    )
    .await?;
    Ok(Json(booking.into()))
}

// PATCH /api/bookings/:id/notes
#[derive(Deserialize)]
pub struct NotesRequest {
    pub internal_notes: String,
}

pub async fn update_notes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<NotesRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let booking = bookings::update_internal_notes(&state, &id, &req.internal_notes, &actor).await?;
    Ok(Json(booking.into()))
}

// POST /api/bookings/:id/payment
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(details): Json<PaymentDetails>,
) -> Result<Json<PaymentReceipt>, AppError> {
    let actor = require_actor(&headers)?;
    let receipt = bookings::record_payment(&state, &id, &actor, details).await?;
    Ok(Json(receipt))
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub owner_id: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let actor = require_actor(&headers)?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            BookingStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown booking status: {raw}")))?,
        ),
        None => None,
    };
    let payment_status = match query.payment_status.as_deref() {
        Some(raw) => Some(
            PaymentStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown payment status: {raw}")))?,
        ),
        None => None,
    };
    let from = match query.from.as_deref() {
        Some(raw) => Some(parse_date_param(raw, "from")?),
        None => None,
    };
    let to = match query.to.as_deref() {
        Some(raw) => Some(parse_date_param(raw, "to")?),
        None => None,
    };

    let bookings = bookings::list_bookings_by_owner(
        &state,
        &actor,
        query.owner_id,
        BookingFilters {
            status,
            payment_status,
            from,
            to,
        },
    )
    .await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

// GET /api/availability
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub venue_id: String,
    pub date: String,
    pub exclude_booking_id: Option<String>,
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<DayAvailability>, AppError> {
    require_actor(&headers)?;
    let date = parse_date_param(&query.date, "date")?;
    let availability = bookings::check_availability(
        &state,
        &query.venue_id,
        date,
        query.exclude_booking_id.as_deref(),
    )
    .await?;
    Ok(Json(availability))
}
