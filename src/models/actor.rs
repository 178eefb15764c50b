use serde::{Deserialize, Serialize};

use crate::models::VenueSummary;

/// An already-authenticated caller. Credential verification happens upstream;
/// this core only checks ownership and role.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Client,
    Provider,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Client => "client",
            ActorRole::Provider => "provider",
            ActorRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(ActorRole::Client),
            "provider" => Some(ActorRole::Provider),
            "admin" => Some(ActorRole::Admin),
            _ => None,
        }
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    /// Admins manage every venue; providers only their own.
    pub fn can_manage_venue(&self, venue: &VenueSummary) -> bool {
        match self.role {
            ActorRole::Admin => true,
            ActorRole::Provider => venue.owner_id == self.id,
            ActorRole::Client => false,
        }
    }
}
