use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::payments::PaymentGateway;
use crate::services::venues::VenueDirectory;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub venues: Box<dyn VenueDirectory>,
    pub payments: Box<dyn PaymentGateway>,
}
