use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::VenueSummary;

/// Venue lookup used by lead and booking operations. Capacity and ownership
/// are re-read on every call rather than trusted from data captured earlier.
#[async_trait]
pub trait VenueDirectory: Send + Sync {
    async fn get_venue(&self, id: &str) -> anyhow::Result<Option<VenueSummary>>;

    async fn list_venues_by_owner(&self, owner_id: &str) -> anyhow::Result<Vec<VenueSummary>>;
}

pub struct SqliteVenueDirectory {
    db: Arc<Mutex<Connection>>,
}

impl SqliteVenueDirectory {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VenueDirectory for SqliteVenueDirectory {
    async fn get_venue(&self, id: &str) -> anyhow::Result<Option<VenueSummary>> {
        let db = self.db.lock().unwrap();
        queries::get_venue(&db, id)
    }

    async fn list_venues_by_owner(&self, owner_id: &str) -> anyhow::Result<Vec<VenueSummary>> {
        let db = self.db.lock().unwrap();
        queries::list_venues_by_owner(&db, owner_id)
    }
}
