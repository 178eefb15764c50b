//! Marketplace commission math. Everything here is pure so the same
//! arithmetic backs quotes, conversions and reports.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Money is rounded to 2 decimal places, half to even.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

pub fn rate_in_range(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE_HUNDRED
}

#[derive(Debug, Clone, Serialize)]
pub struct CommissionBreakdown {
    pub gross_amount: Decimal,
    pub rate: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
}

/// Split a gross amount between the platform and the venue.
///
/// The platform takes `rate` percent of the gross but never less than
/// `min_fee`; the venue payout is whatever remains, floored at zero so a
/// tiny booking cannot produce a negative payout. Callers validate that
/// the gross is positive and the rate is a percentage.
pub fn compute(
    gross: Decimal,
    rate: Option<Decimal>,
    basic_rate: Decimal,
    min_fee: Decimal,
) -> CommissionBreakdown {
    let rate = rate.unwrap_or(basic_rate);
    let commission = round_money((gross * rate / Decimal::ONE_HUNDRED).max(min_fee));
    let payout = round_money((gross - commission).max(Decimal::ZERO));

    CommissionBreakdown {
        gross_amount: gross,
        rate,
        commission,
        payout,
    }
}
