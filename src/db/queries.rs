use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::models::{
    Booking, BookingStatus, Lead, LeadSource, LeadStatus, PaymentStatus, VenueSummary,
};

const LEAD_COLUMNS: &str = "id, venue_id, client_name, client_email, client_phone, event_type, \
     preferred_date, alternative_dates, guest_count, estimated_budget, message, \
     special_requirements, source, status, quoted_amount, final_amount, commission_rate, \
     next_follow_up, messages, created_at, updated_at";

const BOOKING_COLUMNS: &str = "id, lead_id, venue_id, event_name, event_type, event_date, \
     start_time, end_time, guest_count, client_name, client_email, client_phone, gross_amount, \
     commission_rate, commission_amount, venue_payout, currency, status, payment_status, \
     special_requirements, internal_notes, cancelled_at, cancellation_reason, created_at, \
     updated_at";

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn fmt_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn fmt_time(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap_or(NaiveTime::MIN)
}

fn placeholders(start: usize, count: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", start + i))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Venues ──

pub fn insert_venue(conn: &Connection, venue: &VenueSummary) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO venues (id, owner_id, name, capacity_min, capacity_max)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            venue.id,
            venue.owner_id,
            venue.name,
            venue.capacity_min,
            venue.capacity_max,
        ],
    )?;
    Ok(())
}

pub fn get_venue(conn: &Connection, id: &str) -> anyhow::Result<Option<VenueSummary>> {
    let result = conn.query_row(
        "SELECT id, owner_id, name, capacity_min, capacity_max FROM venues WHERE id = ?1",
        params![id],
        |row| {
            Ok(VenueSummary {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                capacity_min: row.get(3)?,
                capacity_max: row.get(4)?,
            })
        },
    );

    match result {
        Ok(venue) => Ok(Some(venue)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_venues_by_owner(conn: &Connection, owner_id: &str) -> anyhow::Result<Vec<VenueSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, capacity_min, capacity_max FROM venues
         WHERE owner_id = ?1 ORDER BY name ASC",
    )?;

    let rows = stmt.query_map(params![owner_id], |row| {
        Ok(VenueSummary {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            capacity_min: row.get(3)?,
            capacity_max: row.get(4)?,
        })
    })?;

    let mut venues = vec![];
    for row in rows {
        venues.push(row?);
    }
    Ok(venues)
}

// ── Leads ──

pub fn insert_lead(conn: &Connection, lead: &Lead) -> anyhow::Result<()> {
    let alternative_dates = serde_json::to_string(&lead.alternative_dates)?;
    let messages = serde_json::to_string(&lead.messages)?;

    conn.execute(
        &format!(
            "INSERT INTO leads ({LEAD_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
        ),
        params![
            lead.id,
            lead.venue_id,
            lead.client_name,
            lead.client_email,
            lead.client_phone,
            lead.event_type,
            fmt_date(&lead.preferred_date),
            alternative_dates,
            lead.guest_count,
            lead.estimated_budget.map(|v| v.to_string()),
            lead.message,
            lead.special_requirements,
            lead.source.as_str(),
            lead.status.as_str(),
            lead.quoted_amount.map(|v| v.to_string()),
            lead.final_amount.map(|v| v.to_string()),
            lead.commission_rate.to_string(),
            lead.next_follow_up.map(|d| fmt_date(&d)),
            messages,
            fmt_ts(&lead.created_at),
            fmt_ts(&lead.updated_at),
        ],
    )?;
    Ok(())
}

/// Persist the columns that lead operations are allowed to change. Contact
/// and event-intent fields are immutable after intake.
pub fn update_lead(conn: &Connection, lead: &Lead) -> anyhow::Result<()> {
    let messages = serde_json::to_string(&lead.messages)?;

    conn.execute(
        "UPDATE leads SET status = ?1, quoted_amount = ?2, final_amount = ?3,
             commission_rate = ?4, next_follow_up = ?5, messages = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            lead.status.as_str(),
            lead.quoted_amount.map(|v| v.to_string()),
            lead.final_amount.map(|v| v.to_string()),
            lead.commission_rate.to_string(),
            lead.next_follow_up.map(|d| fmt_date(&d)),
            messages,
            fmt_ts(&lead.updated_at),
            lead.id,
        ],
    )?;
    Ok(())
}

/// Idempotent: safe to run again if the write after a conversion has to be
/// retried.
pub fn mark_lead_won(conn: &Connection, id: &str, final_amount: Decimal) -> anyhow::Result<()> {
    let now = fmt_ts(&Utc::now().naive_utc());
    conn.execute(
        "UPDATE leads SET status = 'won', final_amount = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, final_amount.to_string(), now],
    )?;
    Ok(())
}

pub fn get_lead_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Lead>> {
    let result = conn.query_row(
        &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
        params![id],
        |row| Ok(parse_lead_row(row)),
    );

    match result {
        Ok(lead) => Ok(Some(lead?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_leads_for_venue(
    conn: &Connection,
    venue_id: &str,
    status: Option<&str>,
) -> anyhow::Result<Vec<Lead>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status {
        Some(status) => (
            format!(
                "SELECT {LEAD_COLUMNS} FROM leads WHERE venue_id = ?1 AND status = ?2
                 ORDER BY created_at DESC"
            ),
            vec![
                Box::new(venue_id.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(status.to_string()),
            ],
        ),
        None => (
            format!("SELECT {LEAD_COLUMNS} FROM leads WHERE venue_id = ?1 ORDER BY created_at DESC"),
            vec![Box::new(venue_id.to_string()) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_lead_row(row)))?;

    let mut leads = vec![];
    for row in rows {
        leads.push(row??);
    }
    Ok(leads)
}

pub fn get_leads_for_venues(
    conn: &Connection,
    venue_ids: &[String],
    status: Option<&str>,
) -> anyhow::Result<Vec<Lead>> {
    if venue_ids.is_empty() {
        return Ok(vec![]);
    }

    let mut sql = format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE venue_id IN ({})",
        placeholders(1, venue_ids.len())
    );
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = venue_ids
        .iter()
        .map(|id| Box::new(id.clone()) as Box<dyn rusqlite::types::ToSql>)
        .collect();

    if let Some(status) = status {
        sql.push_str(&format!(" AND status = ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(status.to_string()));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_lead_row(row)))?;

    let mut leads = vec![];
    for row in rows {
        leads.push(row??);
    }
    Ok(leads)
}

fn parse_lead_row(row: &rusqlite::Row) -> anyhow::Result<Lead> {
    let id: String = row.get(0)?;
    let venue_id: String = row.get(1)?;
    let client_name: String = row.get(2)?;
    let client_email: String = row.get(3)?;
    let client_phone: String = row.get(4)?;
    let event_type: String = row.get(5)?;
    let preferred_date_str: String = row.get(6)?;
    let alternative_dates_json: String = row.get(7)?;
    let guest_count: i32 = row.get(8)?;
    let estimated_budget: Option<String> = row.get(9)?;
    let message: String = row.get(10)?;
    let special_requirements: Option<String> = row.get(11)?;
    let source_str: String = row.get(12)?;
    let status_str: String = row.get(13)?;
    let quoted_amount: Option<String> = row.get(14)?;
    let final_amount: Option<String> = row.get(15)?;
    let commission_rate_str: String = row.get(16)?;
    let next_follow_up: Option<String> = row.get(17)?;
    let messages_json: String = row.get(18)?;
    let created_at_str: String = row.get(19)?;
    let updated_at_str: String = row.get(20)?;

    Ok(Lead {
        id,
        venue_id,
        client_name,
        client_email,
        client_phone,
        event_type,
        preferred_date: parse_date(&preferred_date_str),
        alternative_dates: serde_json::from_str(&alternative_dates_json).unwrap_or_default(),
        guest_count,
        estimated_budget: estimated_budget.and_then(|v| v.parse().ok()),
        message,
        special_requirements,
        source: LeadSource::parse(&source_str).unwrap_or(LeadSource::Website),
        status: LeadStatus::parse(&status_str).unwrap_or(LeadStatus::New),
        quoted_amount: quoted_amount.and_then(|v| v.parse().ok()),
        final_amount: final_amount.and_then(|v| v.parse().ok()),
        commission_rate: commission_rate_str.parse().unwrap_or_default(),
        next_follow_up: next_follow_up.map(|d| parse_date(&d)),
        messages: serde_json::from_str(&messages_json).unwrap_or_default(),
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)"
        ),
        params![
            booking.id,
            booking.lead_id,
            booking.venue_id,
            booking.event_name,
            booking.event_type,
            fmt_date(&booking.event_date),
            fmt_time(&booking.start_time),
            fmt_time(&booking.end_time),
            booking.guest_count,
            booking.client_name,
            booking.client_email,
            booking.client_phone,
            booking.gross_amount.to_string(),
            booking.commission_rate.to_string(),
            booking.commission_amount.to_string(),
            booking.venue_payout.to_string(),
            booking.currency,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.special_requirements,
            booking.internal_notes,
            booking.cancelled_at.map(|ts| fmt_ts(&ts)),
            booking.cancellation_reason,
            fmt_ts(&booking.created_at),
            fmt_ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

/// Persist the columns that booking transitions change. Schedule, client
/// snapshot and the money snapshot are fixed at conversion time.
pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE bookings SET status = ?1, payment_status = ?2, internal_notes = ?3,
             cancelled_at = ?4, cancellation_reason = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.internal_notes,
            booking.cancelled_at.map(|ts| fmt_ts(&ts)),
            booking.cancellation_reason,
            fmt_ts(&booking.updated_at),
            booking.id,
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_booking_by_lead(conn: &Connection, lead_id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE lead_id = ?1"),
        params![lead_id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Active bookings holding the venue on the given calendar date. Matching is
/// by date only; start and end times are not compared.
pub fn find_day_conflicts(
    conn: &Connection,
    venue_id: &str,
    date: NaiveDate,
    exclude_booking_id: Option<&str>,
) -> anyhow::Result<Vec<Booking>> {
    let date_str = fmt_date(&date);

    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match exclude_booking_id
    {
        Some(exclude) => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE venue_id = ?1 AND event_date = ?2
                   AND status IN ('confirmed', 'in_progress') AND id != ?3
                 ORDER BY start_time ASC"
            ),
            vec![
                Box::new(venue_id.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(date_str),
                Box::new(exclude.to_string()),
            ],
        ),
        None => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE venue_id = ?1 AND event_date = ?2
                   AND status IN ('confirmed', 'in_progress')
                 ORDER BY start_time ASC"
            ),
            vec![
                Box::new(venue_id.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(date_str),
            ],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub struct BookingFilters {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub fn get_bookings_for_venues(
    conn: &Connection,
    venue_ids: &[String],
    filters: &BookingFilters,
) -> anyhow::Result<Vec<Booking>> {
    if venue_ids.is_empty() {
        return Ok(vec![]);
    }

    let mut sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE venue_id IN ({})",
        placeholders(1, venue_ids.len())
    );
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = venue_ids
        .iter()
        .map(|id| Box::new(id.clone()) as Box<dyn rusqlite::types::ToSql>)
        .collect();

    if let Some(status) = &filters.status {
        sql.push_str(&format!(" AND status = ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(status.as_str().to_string()));
    }
    if let Some(payment_status) = &filters.payment_status {
        sql.push_str(&format!(" AND payment_status = ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(payment_status.as_str().to_string()));
    }
    if let Some(from) = &filters.from {
        sql.push_str(&format!(" AND event_date >= ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(fmt_date(from)));
    }
    if let Some(to) = &filters.to {
        sql.push_str(&format!(" AND event_date <= ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(fmt_date(to)));
    }
    sql.push_str(" ORDER BY event_date DESC, start_time DESC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Bookings whose payment has settled, for revenue reporting.
pub fn get_settled_bookings_for_venues(
    conn: &Connection,
    venue_ids: &[String],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<Vec<Booking>> {
    if venue_ids.is_empty() {
        return Ok(vec![]);
    }

    let mut sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE payment_status = 'completed' AND venue_id IN ({})",
        placeholders(1, venue_ids.len())
    );
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = venue_ids
        .iter()
        .map(|id| Box::new(id.clone()) as Box<dyn rusqlite::types::ToSql>)
        .collect();

    if let Some(from) = &from {
        sql.push_str(&format!(" AND event_date >= ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(fmt_date(from)));
    }
    if let Some(to) = &to {
        sql.push_str(&format!(" AND event_date <= ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(fmt_date(to)));
    }
    sql.push_str(" ORDER BY event_date ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Settled, fully executed bookings across all owners, joined with the venue
/// owner the commission is collected from.
pub fn get_collectable_commissions(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<Vec<(String, Booking)>> {
    let mut sql = format!(
        "SELECT {}, v.owner_id FROM bookings b
         INNER JOIN venues v ON v.id = b.venue_id
         WHERE b.payment_status = 'completed' AND b.status = 'completed'",
        BOOKING_COLUMNS
            .split(", ")
            .map(|c| format!("b.{c}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(from) = &from {
        sql.push_str(&format!(" AND b.event_date >= ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(fmt_date(from)));
    }
    if let Some(to) = &to {
        sql.push_str(&format!(" AND b.event_date <= ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(fmt_date(to)));
    }
    sql.push_str(" ORDER BY v.owner_id ASC, b.event_date ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        let owner_id: String = row.get(25)?;
        Ok((owner_id, parse_booking_row(row)))
    })?;

    let mut results = vec![];
    for row in rows {
        let (owner_id, booking) = row?;
        results.push((owner_id, booking?));
    }
    Ok(results)
}

/// Not-yet-terminal bookings inside the projection window.
pub fn get_projected_bookings_for_venues(
    conn: &Connection,
    venue_ids: &[String],
    from: NaiveDate,
    to: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    if venue_ids.is_empty() {
        return Ok(vec![]);
    }

    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE status IN ('confirmed', 'in_progress') AND venue_id IN ({})
           AND event_date >= ?{} AND event_date <= ?{}
         ORDER BY event_date ASC",
        placeholders(1, venue_ids.len()),
        venue_ids.len() + 1,
        venue_ids.len() + 2,
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = venue_ids
        .iter()
        .map(|id| Box::new(id.clone()) as Box<dyn rusqlite::types::ToSql>)
        .collect();
    params_vec.push(Box::new(fmt_date(&from)));
    params_vec.push(Box::new(fmt_date(&to)));

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let lead_id: String = row.get(1)?;
    let venue_id: String = row.get(2)?;
    let event_name: String = row.get(3)?;
    let event_type: String = row.get(4)?;
    let event_date_str: String = row.get(5)?;
    let start_time_str: String = row.get(6)?;
    let end_time_str: String = row.get(7)?;
    let guest_count: i32 = row.get(8)?;
    let client_name: String = row.get(9)?;
    let client_email: String = row.get(10)?;
    let client_phone: String = row.get(11)?;
    let gross_amount_str: String = row.get(12)?;
    let commission_rate_str: String = row.get(13)?;
    let commission_amount_str: String = row.get(14)?;
    let venue_payout_str: String = row.get(15)?;
    let currency: String = row.get(16)?;
    let status_str: String = row.get(17)?;
    let payment_status_str: String = row.get(18)?;
    let special_requirements: Option<String> = row.get(19)?;
    let internal_notes: Option<String> = row.get(20)?;
    let cancelled_at: Option<String> = row.get(21)?;
    let cancellation_reason: Option<String> = row.get(22)?;
    let created_at_str: String = row.get(23)?;
    let updated_at_str: String = row.get(24)?;

    Ok(Booking {
        id,
        lead_id,
        venue_id,
        event_name,
        event_type,
        event_date: parse_date(&event_date_str),
        start_time: parse_time(&start_time_str),
        end_time: parse_time(&end_time_str),
        guest_count,
        client_name,
        client_email,
        client_phone,
        gross_amount: gross_amount_str.parse().unwrap_or_default(),
        commission_rate: commission_rate_str.parse().unwrap_or_default(),
        commission_amount: commission_amount_str.parse().unwrap_or_default(),
        venue_payout: venue_payout_str.parse().unwrap_or_default(),
        currency,
        status: BookingStatus::parse(&status_str).unwrap_or(BookingStatus::Confirmed),
        payment_status: PaymentStatus::parse(&payment_status_str).unwrap_or(PaymentStatus::Pending),
        special_requirements,
        internal_notes,
        cancelled_at: cancelled_at.map(|ts| parse_ts(&ts)),
        cancellation_reason,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}
