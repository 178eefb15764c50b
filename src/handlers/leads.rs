use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::{parse_date_param, require_actor};
use crate::models::{Lead, LeadMessage, LeadSource, LeadStatus, MessageKind};
use crate::services::leads::{self, LeadStatusUpdate, NewLead};
use crate::state::AppState;

#[derive(Serialize)]
pub struct MessageResponse {
    sender_id: String,
    sender_role: String,
    body: String,
    kind: String,
    read: bool,
    sent_at: String,
}

impl From<LeadMessage> for MessageResponse {
    fn from(message: LeadMessage) -> Self {
        MessageResponse {
            sender_id: message.sender_id,
            sender_role: message.sender_role.as_str().to_string(),
            body: message.body,
            kind: message.kind.as_str().to_string(),
            read: message.read,
            sent_at: message.sent_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct LeadResponse {
    id: String,
    venue_id: String,
    client_name: String,
    client_email: String,
    client_phone: String,
    event_type: String,
    preferred_date: String,
    alternative_dates: Vec<String>,
    guest_count: i32,
    estimated_budget: Option<Decimal>,
    message: String,
    special_requirements: Option<String>,
    source: String,
    status: String,
    quoted_amount: Option<Decimal>,
    final_amount: Option<Decimal>,
    commission_rate: Decimal,
    next_follow_up: Option<String>,
    messages: Vec<MessageResponse>,
    created_at: String,
    updated_at: String,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        LeadResponse {
            id: lead.id,
            venue_id: lead.venue_id,
            client_name: lead.client_name,
            client_email: lead.client_email,
            client_phone: lead.client_phone,
            event_type: lead.event_type,
            preferred_date: lead.preferred_date.format("%Y-%m-%d").to_string(),
            alternative_dates: lead
                .alternative_dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
            guest_count: lead.guest_count,
            estimated_budget: lead.estimated_budget,
            message: lead.message,
            special_requirements: lead.special_requirements,
            source: lead.source.as_str().to_string(),
            status: lead.status.as_str().to_string(),
            quoted_amount: lead.quoted_amount,
            final_amount: lead.final_amount,
            commission_rate: lead.commission_rate,
            next_follow_up: lead.next_follow_up.map(|d| d.format("%Y-%m-%d").to_string()),
            messages: lead.messages.into_iter().map(MessageResponse::from).collect(),
            created_at: lead.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: lead.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// POST /api/leads
#[derive(Deserialize)]
pub struct CreateLeadRequest {
    pub venue_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub event_type: String,
    pub preferred_date: String,
    #[serde(default)]
    pub alternative_dates: Vec<String>,
    pub guest_count: i32,
    pub estimated_budget: Option<Decimal>,
    pub message: String,
    pub special_requirements: Option<String>,
    pub source: Option<String>,
}

pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    let preferred_date = parse_date_param(&req.preferred_date, "preferred_date")?;
    let mut alternative_dates = vec![];
    for raw in &req.alternative_dates {
        alternative_dates.push(parse_date_param(raw, "alternative_dates")?);
    }
    let source = match req.source.as_deref() {
        Some(raw) => Some(
            LeadSource::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown lead source: {raw}")))?,
        ),
        None => None,
    };

    let lead = leads::create_lead(
        &state,
        NewLead {
            venue_id: req.venue_id,
            client_name: req.client_name,
            client_email: req.client_email,
            client_phone: req.client_phone,
            event_type: req.event_type,
            preferred_date,
            alternative_dates,
            guest_count: req.guest_count,
            estimated_budget: req.estimated_budget,
            message: req.message,
            special_requirements: req.special_requirements,
            source,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(lead.into())))
}

// GET /api/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LeadResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let lead = leads::get_lead(&state, &id, &actor).await?;
    Ok(Json(lead.into()))
}

// POST /api/leads/:id/messages
#[derive(Deserialize)]
pub struct AppendMessageRequest {
    pub body: String,
    pub kind: Option<String>,
}

pub async fn append_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AppendMessageRequest>,
) -> Result<Json<LeadResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let kind = match req.kind.as_deref() {
        Some(raw) => Some(
            MessageKind::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown message kind: {raw}")))?,
        ),
        None => None,
    };

    let lead = leads::append_message(&state, &id, &actor, &req.body, kind).await?;
    Ok(Json(lead.into()))
}

// POST /api/leads/:id/read
pub async fn mark_messages_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LeadResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let lead = leads::mark_messages_read(&state, &id, &actor).await?;
    Ok(Json(lead.into()))
}

// PATCH /api/leads/:id/status
#[derive(Deserialize)]
pub struct LeadStatusRequest {
    pub status: String,
    pub quoted_amount: Option<Decimal>,
    pub final_amount: Option<Decimal>,
    pub next_follow_up: Option<String>,
}

pub async fn set_lead_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<LeadStatusRequest>,
) -> Result<Json<LeadResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let next_follow_up = match req.next_follow_up.as_deref() {
        Some(raw) => Some(parse_date_param(raw, "next_follow_up")?),
        None => None,
    };

    let lead = leads::set_lead_status(
        &state,
        &id,
        &req.status,
        &actor,
        LeadStatusUpdate {
            quoted_amount: req.quoted_amount,
            final_amount: req.final_amount,
            next_follow_up,
        },
    )
    .await?;
    Ok(Json(lead.into()))
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<LeadStatus>, AppError> {
    match raw {
        Some(raw) => Ok(Some(LeadStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(format!("unknown lead status: {raw}"))
        })?)),
        None => Ok(None),
    }
}

// GET /api/venues/:venue_id/leads
#[derive(Deserialize)]
pub struct LeadListQuery {
    pub status: Option<String>,
}

pub async fn list_venue_leads(
    State(state): State<Arc<AppState>>,
    Path(venue_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<Vec<LeadResponse>>, AppError> {
    let actor = require_actor(&headers)?;
    let status = parse_status_filter(query.status.as_deref())?;
    let leads = leads::list_leads_by_venue(&state, &venue_id, &actor, status).await?;
    Ok(Json(leads.into_iter().map(LeadResponse::from).collect()))
}

// GET /api/leads
#[derive(Deserialize)]
pub struct OwnedLeadsQuery {
    pub status: Option<String>,
    pub owner_id: Option<String>,
}

pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OwnedLeadsQuery>,
) -> Result<Json<Vec<LeadResponse>>, AppError> {
    let actor = require_actor(&headers)?;
    let status = parse_status_filter(query.status.as_deref())?;
    let leads = leads::list_leads_by_owner(&state, &actor, query.owner_id, status).await?;
    Ok(Json(leads.into_iter().map(LeadResponse::from).collect()))
}
