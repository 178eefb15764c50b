use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Actor, ActorRole, Booking};
use crate::services::commission;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RevenueTotals {
    pub gross: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
    pub bookings: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub gross: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
    pub bookings: i64,
}

#[derive(Debug, Serialize)]
pub struct VenueRevenue {
    pub venue_id: String,
    pub venue_name: String,
    pub gross: Decimal,
    pub commission: Decimal,
    pub payout: Decimal,
    pub bookings: i64,
    pub average_gross: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RevenueReport {
    pub totals: RevenueTotals,
    pub by_month: Vec<MonthlyRevenue>,
    pub by_venue: Vec<VenueRevenue>,
}

#[derive(Debug, Serialize)]
pub struct CommissionItem {
    pub booking_id: String,
    pub venue_id: String,
    pub event_name: String,
    pub event_date: String,
    pub commission: Decimal,
}

#[derive(Debug, Serialize)]
pub struct OwnerCommissions {
    pub owner_id: String,
    pub total_commissions: Decimal,
    pub bookings: i64,
    pub items: Vec<CommissionItem>,
}

#[derive(Debug, Serialize)]
pub struct CommissionsDue {
    pub total_commissions: Decimal,
    pub bookings: i64,
    pub owners: Vec<OwnerCommissions>,
}

#[derive(Debug, Serialize)]
pub struct ProjectionReport {
    pub from: String,
    pub to: String,
    pub totals: RevenueTotals,
    pub by_month: Vec<MonthlyRevenue>,
}

// Sums run over the stored snapshots; gross and rate are never multiplied
// back together at read time.
fn sum_totals(bookings: &[Booking]) -> RevenueTotals {
    let mut totals = RevenueTotals {
        gross: Decimal::ZERO,
        commission: Decimal::ZERO,
        payout: Decimal::ZERO,
        bookings: 0,
    };
    for booking in bookings {
        totals.gross += booking.gross_amount;
        totals.commission += booking.commission_amount;
        totals.payout += booking.venue_payout;
        totals.bookings += 1;
    }
    totals
}

fn month_buckets(bookings: &[Booking]) -> Vec<MonthlyRevenue> {
    let mut buckets: BTreeMap<String, MonthlyRevenue> = BTreeMap::new();
    for booking in bookings {
        let month = booking.event_date.format("%Y-%m").to_string();
        let bucket = buckets.entry(month.clone()).or_insert(MonthlyRevenue {
            month,
            gross: Decimal::ZERO,
            commission: Decimal::ZERO,
            payout: Decimal::ZERO,
            bookings: 0,
        });
        bucket.gross += booking.gross_amount;
        bucket.commission += booking.commission_amount;
        bucket.payout += booking.venue_payout;
        bucket.bookings += 1;
    }
    buckets.into_values().collect()
}

fn resolve_owner(actor: &Actor, owner_override: Option<String>) -> Result<String, AppError> {
    match actor.role {
        ActorRole::Admin => Ok(owner_override.unwrap_or_else(|| actor.id.clone())),
        ActorRole::Provider => Ok(actor.id.clone()),
        ActorRole::Client => Err(AppError::Forbidden(
            "only providers and admins may view reports".to_string(),
        )),
    }
}

/// Settled revenue for one owner: totals, per-month buckets in
/// chronological order, and per-venue rows. An owner with no venues or no
/// settled bookings gets a zeroed report.
pub async fn revenue_report(
    state: &Arc<AppState>,
    actor: &Actor,
    owner_override: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<RevenueReport, AppError> {
    let owner_id = resolve_owner(actor, owner_override)?;

    let venues = state.venues.list_venues_by_owner(&owner_id).await?;
    let venue_ids: Vec<String> = venues.iter().map(|v| v.id.clone()).collect();

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_settled_bookings_for_venues(&db, &venue_ids, from, to)?
    };

    let mut by_venue = vec![];
    for venue in &venues {
        let rows: Vec<Booking> = bookings
            .iter()
            .filter(|b| b.venue_id == venue.id)
            .cloned()
            .collect();
        if rows.is_empty() {
            continue;
        }
        let totals = sum_totals(&rows);
        let average_gross =
            commission::round_money(totals.gross / Decimal::from(totals.bookings));
        by_venue.push(VenueRevenue {
            venue_id: venue.id.clone(),
            venue_name: venue.name.clone(),
            gross: totals.gross,
            commission: totals.commission,
            payout: totals.payout,
            bookings: totals.bookings,
            average_gross,
        });
    }

    Ok(RevenueReport {
        totals: sum_totals(&bookings),
        by_month: month_buckets(&bookings),
        by_venue,
    })
}

/// Platform collection view: commission owed per venue owner, largest debt
/// first. A booking counts once it is fully executed and fully paid.
pub async fn pending_commissions(
    state: &Arc<AppState>,
    actor: &Actor,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<CommissionsDue, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden(
            "only admins may view platform commissions".to_string(),
        ));
    }

    let rows = {
        let db = state.db.lock().unwrap();
        queries::get_collectable_commissions(&db, from, to)?
    };

    let mut grouped: BTreeMap<String, OwnerCommissions> = BTreeMap::new();
    let mut total_commissions = Decimal::ZERO;
    let mut total_bookings = 0;

    for (owner_id, booking) in rows {
        let entry = grouped
            .entry(owner_id.clone())
            .or_insert(OwnerCommissions {
                owner_id,
                total_commissions: Decimal::ZERO,
                bookings: 0,
                items: vec![],
            });
        entry.total_commissions += booking.commission_amount;
        entry.bookings += 1;
        entry.items.push(CommissionItem {
            booking_id: booking.id,
            venue_id: booking.venue_id,
            event_name: booking.event_name,
            event_date: booking.event_date.format("%Y-%m-%d").to_string(),
            commission: booking.commission_amount,
        });
        total_commissions += booking.commission_amount;
        total_bookings += 1;
    }

    let mut owners: Vec<OwnerCommissions> = grouped.into_values().collect();
    owners.sort_by(|a, b| b.total_commissions.cmp(&a.total_commissions));

    Ok(CommissionsDue {
        total_commissions,
        bookings: total_bookings,
        owners,
    })
}

/// Forward-looking estimate over bookings that are still active: revenue
/// already on the calendar, not revenue in the bank.
pub async fn projection(
    state: &Arc<AppState>,
    actor: &Actor,
    owner_override: Option<String>,
    months_ahead: Option<u32>,
) -> Result<ProjectionReport, AppError> {
    let owner_id = resolve_owner(actor, owner_override)?;

    let months = months_ahead.unwrap_or(3);
    if !(1..=12).contains(&months) {
        return Err(AppError::Validation(
            "months must be between 1 and 12".to_string(),
        ));
    }

    let from = Utc::now().date_naive();
    let to = from + chrono::Months::new(months) - chrono::Duration::days(1);

    let venues = state.venues.list_venues_by_owner(&owner_id).await?;
    let venue_ids: Vec<String> = venues.iter().map(|v| v.id.clone()).collect();

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_projected_bookings_for_venues(&db, &venue_ids, from, to)?
    };

    Ok(ProjectionReport {
        from: from.format("%Y-%m-%d").to_string(),
        to: to.format("%Y-%m-%d").to_string(),
        totals: sum_totals(&bookings),
        by_month: month_buckets(&bookings),
    })
}
