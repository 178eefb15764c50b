use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::db::queries::{self, BookingFilters};
use crate::errors::AppError;
use crate::models::{Actor, ActorRole, Booking, BookingStatus, PaymentStatus};
use crate::services::availability::{self, DayAvailability};
use crate::services::commission;
use crate::services::payments::PaymentDetails;
use crate::state::AppState;

pub struct NewBookingData {
    pub event_name: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub guest_count: Option<i32>,
    pub gross_amount: Decimal,
    pub commission_rate: Option<Decimal>,
    pub special_requirements: Option<String>,
}

#[derive(Default)]
pub struct BookingStatusUpdate {
    pub cancellation_reason: Option<String>,
    pub internal_notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub error_code: Option<String>,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
}

async fn ensure_booking_access(
    state: &Arc<AppState>,
    booking: &Booking,
    actor: &Actor,
) -> Result<(), AppError> {
    if actor.is_admin() {
        return Ok(());
    }
    if actor.role != ActorRole::Provider {
        return Err(AppError::Forbidden(
            "only the venue provider or an admin may do this".to_string(),
        ));
    }

    let venue = state
        .venues
        .get_venue(&booking.venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("venue not found".to_string()))?;

    if !actor.can_manage_venue(&venue) {
        return Err(AppError::Forbidden(
            "you do not manage this venue".to_string(),
        ));
    }
    Ok(())
}

/// The insert can lose two races: another conversion of the same lead, or
/// another booking taking the venue on that date. Both surface from the
/// storage layer as unique-constraint failures.
fn map_insert_conflict(e: anyhow::Error) -> AppError {
    if let Some(rusqlite::Error::SqliteFailure(code, Some(msg))) =
        e.downcast_ref::<rusqlite::Error>()
    {
        if code.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("lead_id") {
                return AppError::Conflict(
                    "lead has already been converted to a booking".to_string(),
                );
            }
            return AppError::Conflict(
                "venue is already booked on the selected date".to_string(),
            );
        }
    }
    AppError::Internal(e)
}

/// Turns a won-eligible lead into a confirmed booking.
///
/// The booking insert is the authoritative write. Marking the lead `won`
/// afterwards is retried a few times and the booking is never rolled back:
/// a lead stuck in its old status is a nuisance, a vanished booking is a
/// double-sell.
pub async fn convert_lead(
    state: &Arc<AppState>,
    lead_id: &str,
    data: NewBookingData,
    actor: &Actor,
) -> Result<Booking, AppError> {
    let lead = {
        let db = state.db.lock().unwrap();
        queries::get_lead_by_id(&db, lead_id)?
    }
    .ok_or_else(|| AppError::NotFound("lead not found".to_string()))?;

    let venue = state
        .venues
        .get_venue(&lead.venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("venue not found".to_string()))?;
    if !actor.can_manage_venue(&venue) {
        return Err(AppError::Forbidden(
            "you do not manage this venue".to_string(),
        ));
    }

    if !lead.status.is_convertible() {
        return Err(AppError::InvalidState(format!(
            "lead in status '{}' cannot be converted",
            lead.status.as_str()
        )));
    }
    {
        let db = state.db.lock().unwrap();
        if queries::get_booking_by_lead(&db, &lead.id)?.is_some() {
            return Err(AppError::Conflict(
                "lead has already been converted to a booking".to_string(),
            ));
        }
    }

    let today = Utc::now().date_naive();
    if data.event_date < today {
        return Err(AppError::Validation(
            "event date cannot be in the past".to_string(),
        ));
    }

    let minutes = (data.end_time - data.start_time).num_minutes();
    if minutes <= 0 {
        return Err(AppError::Validation(
            "end time must be after start time".to_string(),
        ));
    }
    if minutes > 24 * 60 {
        return Err(AppError::Validation(
            "event cannot run longer than 24 hours".to_string(),
        ));
    }

    if data.gross_amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "gross amount must be greater than zero".to_string(),
        ));
    }
    if let Some(rate) = data.commission_rate {
        if !commission::rate_in_range(rate) {
            return Err(AppError::Validation(
                "commission rate must be between 0 and 100".to_string(),
            ));
        }
    }

    let guest_count = data.guest_count.unwrap_or(lead.guest_count);
    if guest_count < 1 {
        return Err(AppError::Validation(
            "guest count must be at least 1".to_string(),
        ));
    }

    let event_name = match data.event_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(name) => {
            if name.len() > 150 {
                return Err(AppError::Validation(
                    "event name cannot exceed 150 characters".to_string(),
                ));
            }
            name
        }
        None => format!("{} - {}", lead.event_type, lead.client_name),
    };

    let special_requirements = match data
        .special_requirements
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        Some(reqs) => {
            if reqs.len() > 1000 {
                return Err(AppError::Validation(
                    "special requirements cannot exceed 1000 characters".to_string(),
                ));
            }
            Some(reqs)
        }
        None => lead.special_requirements.clone(),
    };

    {
        let db = state.db.lock().unwrap();
        let day = availability::check_date(&db, &lead.venue_id, data.event_date, None)?;
        if !day.available {
            return Err(AppError::Conflict(
                "venue is already booked on the selected date".to_string(),
            ));
        }
    }

    let breakdown = commission::compute(
        data.gross_amount,
        data.commission_rate.or(Some(lead.commission_rate)),
        state.config.commission_basic_rate,
        state.config.commission_min_fee,
    );

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        lead_id: lead.id.clone(),
        venue_id: lead.venue_id.clone(),
        event_name,
        event_type: lead.event_type.clone(),
        event_date: data.event_date,
        start_time: data.start_time,
        end_time: data.end_time,
        guest_count,
        client_name: lead.client_name.clone(),
        client_email: lead.client_email.clone(),
        client_phone: lead.client_phone.clone(),
        gross_amount: breakdown.gross_amount,
        commission_rate: breakdown.rate,
        commission_amount: breakdown.commission,
        venue_payout: breakdown.payout,
        currency: state.config.currency.clone(),
        status: BookingStatus::Confirmed,
        payment_status: PaymentStatus::Pending,
        special_requirements,
        internal_notes: None,
        cancelled_at: None,
        cancellation_reason: None,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        if let Err(e) = queries::insert_booking(&db, &booking) {
            return Err(map_insert_conflict(e));
        }
    }

    let mut marked = false;
    for attempt in 1..=3 {
        let result = {
            let db = state.db.lock().unwrap();
            queries::mark_lead_won(&db, &lead.id, booking.gross_amount)
        };
        match result {
            Ok(()) => {
                marked = true;
                break;
            }
            Err(e) => {
                tracing::warn!(
                    lead_id = %lead.id,
                    attempt,
                    error = %e,
                    "failed to mark lead won after conversion"
                );
            }
        }
    }
    if !marked {
        tracing::error!(
            lead_id = %lead.id,
            booking_id = %booking.id,
            "lead could not be marked won; booking stands"
        );
        return Err(AppError::Internal(anyhow::anyhow!(
            "booking {} was created but lead {} could not be updated",
            booking.id,
            lead.id
        )));
    }

    tracing::info!(
        booking_id = %booking.id,
        lead_id = %lead.id,
        venue_id = %booking.venue_id,
        gross = %booking.gross_amount,
        commission = %booking.commission_amount,
        "lead converted to booking"
    );
    Ok(booking)
}

pub async fn set_booking_status(
    state: &Arc<AppState>,
    booking_id: &str,
    new_status: &str,
    actor: &Actor,
    update: BookingStatusUpdate,
) -> Result<Booking, AppError> {
    let mut booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, booking_id)?
    }
    .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    ensure_booking_access(state, &booking, actor).await?;

    let status = BookingStatus::parse(new_status)
        .ok_or_else(|| AppError::InvalidState(format!("unknown booking status: {new_status}")))?;

    if !booking.status.can_transition_to(status) {
        return Err(AppError::InvalidState(format!(
            "cannot change booking from '{}' to '{}'",
            booking.status.as_str(),
            status.as_str()
        )));
    }

    let now = Utc::now().naive_utc();
    match status {
        BookingStatus::Cancelled => {
            let reason = update
                .cancellation_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| {
                    AppError::Validation("a cancellation reason is required".to_string())
                })?;
            if reason.len() > 500 {
                return Err(AppError::Validation(
                    "cancellation reason cannot exceed 500 characters".to_string(),
                ));
            }
            booking.cancelled_at = Some(now);
            booking.cancellation_reason = Some(reason.to_string());
            booking.payment_status = PaymentStatus::Refunded;
        }
        BookingStatus::Completed => {
            booking.payment_status = PaymentStatus::Completed;
        }
        BookingStatus::Confirmed | BookingStatus::InProgress => {}
    }

    if let Some(notes) = update.internal_notes {
        let notes = notes.trim().to_string();
        if notes.len() > 500 {
            return Err(AppError::Validation(
                "internal notes cannot exceed 500 characters".to_string(),
            ));
        }
        booking.internal_notes = if notes.is_empty() { None } else { Some(notes) };
    }

    booking.status = status;
    booking.updated_at = now;
    {
        let db = state.db.lock().unwrap();
        queries::update_booking(&db, &booking)?;
    }

    tracing::info!(
        booking_id = %booking.id,
        status = status.as_str(),
        payment_status = booking.payment_status.as_str(),
        "booking status changed"
    );
    Ok(booking)
}

/// Internal notes stay editable in every status, terminal ones included.
pub async fn update_internal_notes(
    state: &Arc<AppState>,
    booking_id: &str,
    notes: &str,
    actor: &Actor,
) -> Result<Booking, AppError> {
    let mut booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, booking_id)?
    }
    .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    ensure_booking_access(state, &booking, actor).await?;

    let notes = notes.trim().to_string();
    if notes.len() > 500 {
        return Err(AppError::Validation(
            "internal notes cannot exceed 500 characters".to_string(),
        ));
    }

    booking.internal_notes = if notes.is_empty() { None } else { Some(notes) };
    booking.updated_at = Utc::now().naive_utc();
    {
        let db = state.db.lock().unwrap();
        queries::update_booking(&db, &booking)?;
    }
    Ok(booking)
}

/// Charges through the configured gateway. A declined charge leaves the
/// booking untouched and comes back as a receipt with `success: false`.
pub async fn record_payment(
    state: &Arc<AppState>,
    booking_id: &str,
    actor: &Actor,
    details: PaymentDetails,
) -> Result<PaymentReceipt, AppError> {
    let mut booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, booking_id)?
    }
    .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    ensure_booking_access(state, &booking, actor).await?;

    if booking.payment_status == PaymentStatus::Completed {
        return Err(AppError::InvalidState(
            "payment has already been processed".to_string(),
        ));
    }
    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::InvalidState(
            "cannot record a payment on a cancelled booking".to_string(),
        ));
    }

    let outcome = state.payments.process_payment(&booking, &details).await?;

    if outcome.success {
        booking.payment_status = PaymentStatus::Completed;
        if booking.status == BookingStatus::Confirmed {
            booking.status = BookingStatus::InProgress;
        }
        booking.updated_at = Utc::now().naive_utc();
        {
            let db = state.db.lock().unwrap();
            queries::update_booking(&db, &booking)?;
        }
        tracing::info!(
            booking_id = %booking.id,
            transaction_id = outcome.transaction_id.as_deref().unwrap_or("-"),
            "payment recorded"
        );
    } else {
        tracing::warn!(
            booking_id = %booking.id,
            error_code = outcome.error_code.as_deref().unwrap_or("-"),
            "payment declined"
        );
    }

    Ok(PaymentReceipt {
        success: outcome.success,
        transaction_id: outcome.transaction_id,
        error_code: outcome.error_code,
        booking_status: booking.status,
        payment_status: booking.payment_status,
    })
}

pub async fn check_availability(
    state: &Arc<AppState>,
    venue_id: &str,
    date: NaiveDate,
    exclude_booking_id: Option<&str>,
) -> Result<DayAvailability, AppError> {
    state
        .venues
        .get_venue(venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("venue not found".to_string()))?;

    let db = state.db.lock().unwrap();
    Ok(availability::check_date(
        &db,
        venue_id,
        date,
        exclude_booking_id,
    )?)
}

// Public read: the client-facing confirmation page fetches by id.
pub async fn get_booking(state: &Arc<AppState>, booking_id: &str) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_by_id(&db, booking_id)?
    };
    booking.ok_or_else(|| AppError::NotFound("booking not found".to_string()))
}

pub async fn list_bookings_by_owner(
    state: &Arc<AppState>,
    actor: &Actor,
    owner_override: Option<String>,
    filters: BookingFilters,
) -> Result<Vec<Booking>, AppError> {
    let owner_id = match actor.role {
        ActorRole::Admin => owner_override.unwrap_or_else(|| actor.id.clone()),
        ActorRole::Provider => actor.id.clone(),
        ActorRole::Client => {
            return Err(AppError::Forbidden(
                "only providers and admins may list bookings".to_string(),
            ))
        }
    };

    let venues = state.venues.list_venues_by_owner(&owner_id).await?;
    let venue_ids: Vec<String> = venues.into_iter().map(|v| v.id).collect();

    let db = state.db.lock().unwrap();
    Ok(queries::get_bookings_for_venues(&db, &venue_ids, &filters)?)
}
