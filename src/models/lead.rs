use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ActorRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
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
    pub source: LeadSource,
    pub status: LeadStatus,
    pub quoted_amount: Option<Decimal>,
    pub final_amount: Option<Decimal>,
    pub commission_rate: Decimal,
    pub next_follow_up: Option<NaiveDate>,
    pub messages: Vec<LeadMessage>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Quoted,
    Negotiating,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Quoted => "quoted",
            LeadStatus::Negotiating => "negotiating",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "quoted" => Some(LeadStatus::Quoted),
            "negotiating" => Some(LeadStatus::Negotiating),
            "won" => Some(LeadStatus::Won),
            "lost" => Some(LeadStatus::Lost),
            _ => None,
        }
    }

    /// A lead can become a booking only once negotiation has produced a
    /// number the client has seen.
    pub fn is_convertible(&self) -> bool {
        matches!(
            self,
            LeadStatus::Quoted | LeadStatus::Negotiating | LeadStatus::Won
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Referral,
    SocialMedia,
    Other,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Website => "website",
            LeadSource::Referral => "referral",
            LeadSource::SocialMedia => "social_media",
            LeadSource::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "website" => Some(LeadSource::Website),
            "referral" => Some(LeadSource::Referral),
            "social_media" => Some(LeadSource::SocialMedia),
            "other" => Some(LeadSource::Other),
            _ => None,
        }
    }
}

/// One entry in a lead's negotiation thread. The whole thread is persisted
/// as a JSON column on the lead row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadMessage {
    pub sender_id: String,
    pub sender_role: ActorRole,
    pub body: String,
    pub kind: MessageKind,
    pub read: bool,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Message,
    Quote,
    Contract,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::Quote => "quote",
            MessageKind::Contract => "contract",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "message" => Some(MessageKind::Message),
            "quote" => Some(MessageKind::Quote),
            "contract" => Some(MessageKind::Contract),
            _ => None,
        }
    }
}
