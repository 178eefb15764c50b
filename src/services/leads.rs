use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Actor, ActorRole, Lead, LeadMessage, LeadSource, LeadStatus, MessageKind};
use crate::state::AppState;

pub struct NewLead {
    pub venue_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub event_type: String,
    pub preferred_date: NaiveDate,
    pub alternative_dates: Vec<NaiveDate>,
    pub guest_count: i32,
    pub estimated_budget: Option<Decimal>,
    pub message: String,
    pub special_requirements: Option<String>,
    pub source: Option<LeadSource>,
}

#[derive(Default)]
pub struct LeadStatusUpdate {
    pub quoted_amount: Option<Decimal>,
    pub final_amount: Option<Decimal>,
    pub next_follow_up: Option<NaiveDate>,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.contains('@')
        && !email.contains(' ')
}

/// Admins pass; providers must own the lead's venue; everyone else is
/// rejected.
async fn ensure_lead_access(
    state: &Arc<AppState>,
    lead: &Lead,
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
        .get_venue(&lead.venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("venue not found".to_string()))?;

    if !actor.can_manage_venue(&venue) {
        return Err(AppError::Forbidden(
            "you do not manage this venue".to_string(),
        ));
    }
    Ok(())
}

// Public intake: no actor, every field is distrusted.
pub async fn create_lead(state: &Arc<AppState>, data: NewLead) -> Result<Lead, AppError> {
    let client_name = data.client_name.trim().to_string();
    if client_name.len() < 2 || client_name.len() > 100 {
        return Err(AppError::Validation(
            "client name must be between 2 and 100 characters".to_string(),
        ));
    }

    let client_email = data.client_email.trim().to_string();
    if client_email.len() > 100 || !is_valid_email(&client_email) {
        return Err(AppError::Validation(
            "client email is not a valid address".to_string(),
        ));
    }

    let client_phone = data.client_phone.trim().to_string();
    if !(7..=8).contains(&client_phone.len())
        || !client_phone.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AppError::Validation(
            "client phone must be 7 or 8 digits".to_string(),
        ));
    }

    let event_type = data.event_type.trim().to_string();
    if event_type.len() < 3 || event_type.len() > 100 {
        return Err(AppError::Validation(
            "event type must be between 3 and 100 characters".to_string(),
        ));
    }

    let message = data.message.trim().to_string();
    if message.len() < 10 || message.len() > 1000 {
        return Err(AppError::Validation(
            "message must be between 10 and 1000 characters".to_string(),
        ));
    }

    let special_requirements = data
        .special_requirements
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if special_requirements.as_ref().is_some_and(|s| s.len() > 500) {
        return Err(AppError::Validation(
            "special requirements cannot exceed 500 characters".to_string(),
        ));
    }

    if !(1..=10_000).contains(&data.guest_count) {
        return Err(AppError::Validation(
            "guest count must be between 1 and 10000".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    if data.preferred_date < today {
        return Err(AppError::Validation(
            "preferred date cannot be in the past".to_string(),
        ));
    }
    if data.preferred_date > today + chrono::Months::new(24) {
        return Err(AppError::Validation(
            "preferred date cannot be more than 2 years ahead".to_string(),
        ));
    }

    if data.alternative_dates.len() > 5 {
        return Err(AppError::Validation(
            "at most 5 alternative dates are allowed".to_string(),
        ));
    }
    if data.alternative_dates.iter().any(|d| *d < today) {
        return Err(AppError::Validation(
            "alternative dates cannot be in the past".to_string(),
        ));
    }

    if data.estimated_budget.is_some_and(|b| b < Decimal::ZERO) {
        return Err(AppError::Validation(
            "estimated budget cannot be negative".to_string(),
        ));
    }

    let venue = state
        .venues
        .get_venue(&data.venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("venue not found".to_string()))?;

    if data.guest_count > venue.capacity_max {
        return Err(AppError::Validation(format!(
            "guest count ({}) exceeds the venue capacity ({})",
            data.guest_count, venue.capacity_max
        )));
    }
    if data.guest_count < venue.capacity_min {
        return Err(AppError::Validation(format!(
            "guest count ({}) is below the venue minimum ({})",
            data.guest_count, venue.capacity_min
        )));
    }

    let now = Utc::now().naive_utc();
    let lead = Lead {
        id: Uuid::new_v4().to_string(),
        venue_id: venue.id,
        client_name,
        client_email,
        client_phone,
        event_type,
        preferred_date: data.preferred_date,
        alternative_dates: data.alternative_dates,
        guest_count: data.guest_count,
        estimated_budget: data.estimated_budget,
        message,
        special_requirements,
        source: data.source.unwrap_or(LeadSource::Website),
        status: LeadStatus::New,
        quoted_amount: None,
        final_amount: None,
        commission_rate: state.config.commission_basic_rate,
        next_follow_up: None,
        messages: vec![],
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::insert_lead(&db, &lead)?;
    }

    tracing::info!(lead_id = %lead.id, venue_id = %lead.venue_id, "lead created");
    Ok(lead)
}

pub async fn append_message(
    state: &Arc<AppState>,
    lead_id: &str,
    actor: &Actor,
    body: &str,
    kind: Option<MessageKind>,
) -> Result<Lead, AppError> {
    let body = body.trim().to_string();
    if body.is_empty() || body.len() > 2000 {
        return Err(AppError::Validation(
            "message body must be between 1 and 2000 characters".to_string(),
        ));
    }

    let mut lead = {
        let db = state.db.lock().unwrap();
        queries::get_lead_by_id(&db, lead_id)?
    }
    .ok_or_else(|| AppError::NotFound("lead not found".to_string()))?;

    // Clients write into the thread of any lead; the out-of-scope public
    // layer is what ties a client to their own inquiries.
    if actor.role == ActorRole::Provider {
        ensure_lead_access(state, &lead, actor).await?;
    }

    let now = Utc::now().naive_utc();
    lead.messages.push(LeadMessage {
        sender_id: actor.id.clone(),
        sender_role: actor.role,
        body,
        kind: kind.unwrap_or(MessageKind::Message),
        read: false,
        sent_at: now,
    });

    if actor.role == ActorRole::Provider && lead.status == LeadStatus::New {
        lead.status = LeadStatus::Contacted;
        tracing::info!(lead_id = %lead.id, "lead advanced to contacted on first provider reply");
    }

    lead.updated_at = now;
    {
        let db = state.db.lock().unwrap();
        queries::update_lead(&db, &lead)?;
    }
    Ok(lead)
}

/// Marks every message authored by the other side as read.
pub async fn mark_messages_read(
    state: &Arc<AppState>,
    lead_id: &str,
    actor: &Actor,
) -> Result<Lead, AppError> {
    let mut lead = {
        let db = state.db.lock().unwrap();
        queries::get_lead_by_id(&db, lead_id)?
    }
    .ok_or_else(|| AppError::NotFound("lead not found".to_string()))?;

    ensure_lead_access(state, &lead, actor).await?;

    for message in &mut lead.messages {
        if message.sender_role != actor.role {
            message.read = true;
        }
    }

    lead.updated_at = Utc::now().naive_utc();
    {
        let db = state.db.lock().unwrap();
        queries::update_lead(&db, &lead)?;
    }
    Ok(lead)
}

/// Lead statuses move freely: sales conversations loop back all the time, so
/// any status can be written over any other by an authorized actor.
pub async fn set_lead_status(
    state: &Arc<AppState>,
    lead_id: &str,
    new_status: &str,
    actor: &Actor,
    update: LeadStatusUpdate,
) -> Result<Lead, AppError> {
    let mut lead = {
        let db = state.db.lock().unwrap();
        queries::get_lead_by_id(&db, lead_id)?
    }
    .ok_or_else(|| AppError::NotFound("lead not found".to_string()))?;

    ensure_lead_access(state, &lead, actor).await?;

    let status = LeadStatus::parse(new_status)
        .ok_or_else(|| AppError::InvalidState(format!("unknown lead status: {new_status}")))?;

    if status == LeadStatus::Quoted {
        if let Some(quoted) = update.quoted_amount {
            if quoted < Decimal::ZERO {
                return Err(AppError::Validation(
                    "quoted amount cannot be negative".to_string(),
                ));
            }
            lead.quoted_amount = Some(quoted);
        }
    }
    if status == LeadStatus::Won {
        if let Some(final_amount) = update.final_amount {
            if final_amount < Decimal::ZERO {
                return Err(AppError::Validation(
                    "final amount cannot be negative".to_string(),
                ));
            }
            lead.final_amount = Some(final_amount);
        }
    }
    if let Some(follow_up) = update.next_follow_up {
        lead.next_follow_up = Some(follow_up);
    }

    lead.status = status;
    lead.updated_at = Utc::now().naive_utc();
    {
        let db = state.db.lock().unwrap();
        queries::update_lead(&db, &lead)?;
    }

    tracing::info!(lead_id = %lead.id, status = status.as_str(), "lead status changed");
    Ok(lead)
}

pub async fn get_lead(
    state: &Arc<AppState>,
    lead_id: &str,
    actor: &Actor,
) -> Result<Lead, AppError> {
    let lead = {
        let db = state.db.lock().unwrap();
        queries::get_lead_by_id(&db, lead_id)?
    }
    .ok_or_else(|| AppError::NotFound("lead not found".to_string()))?;

    ensure_lead_access(state, &lead, actor).await?;
    Ok(lead)
}

pub async fn list_leads_by_venue(
    state: &Arc<AppState>,
    venue_id: &str,
    actor: &Actor,
    status_filter: Option<LeadStatus>,
) -> Result<Vec<Lead>, AppError> {
    let venue = state
        .venues
        .get_venue(venue_id)
        .await?
        .ok_or_else(|| AppError::NotFound("venue not found".to_string()))?;

    if !actor.can_manage_venue(&venue) {
        return Err(AppError::Forbidden(
            "you do not manage this venue".to_string(),
        ));
    }

    let db = state.db.lock().unwrap();
    Ok(queries::get_leads_for_venue(
        &db,
        venue_id,
        status_filter.map(|s| s.as_str()),
    )?)
}

/// Leads across every venue the owner manages, newest first. Admins may
/// read another owner's funnel by passing `owner_override`.
pub async fn list_leads_by_owner(
    state: &Arc<AppState>,
    actor: &Actor,
    owner_override: Option<String>,
    status_filter: Option<LeadStatus>,
) -> Result<Vec<Lead>, AppError> {
    let owner_id = match actor.role {
        ActorRole::Admin => owner_override.unwrap_or_else(|| actor.id.clone()),
        ActorRole::Provider => actor.id.clone(),
        ActorRole::Client => {
            return Err(AppError::Forbidden(
                "only providers and admins may list leads".to_string(),
            ))
        }
    };

    let venues = state.venues.list_venues_by_owner(&owner_id).await?;
    let venue_ids: Vec<String> = venues.into_iter().map(|v| v.id).collect();

    let db = state.db.lock().unwrap();
    Ok(queries::get_leads_for_venues(
        &db,
        &venue_ids,
        status_filter.map(|s| s.as_str()),
    )?)
}
