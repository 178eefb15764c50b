use std::env;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Platform commission percentage applied when a booking does not carry
    /// its own rate.
    pub commission_basic_rate: Decimal,
    /// Floor for the platform fee, in currency units.
    pub commission_min_fee: Decimal,
    pub currency: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "venuebook.db".to_string()),
            commission_basic_rate: env::var("COMMISSION_BASIC_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(dec!(10)),
            commission_min_fee: env::var("COMMISSION_MIN_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(dec!(100)),
            currency: env::var("CURRENCY").unwrap_or_else(|_| "BOB".to_string()),
        }
    }
}
