use serde::{Deserialize, Serialize};

/// The slice of venue data this engine consumes. Venue management itself
/// lives outside the core; lookups go through `services::venues` and are
/// re-read on every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSummary {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub capacity_min: i32,
    pub capacity_max: i32,
}
