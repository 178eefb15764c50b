use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;

#[derive(Debug, Clone, Serialize)]
pub struct DayConflict {
    pub id: String,
    pub event_name: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub available: bool,
    pub conflicts: Vec<DayConflict>,
}

/// Whether a venue can take a booking on the given calendar date.
///
/// A conflict is any other booking holding the venue on that date in a
/// status that still occupies it. Matching is by date only: two events on
/// the same date conflict even when their hours do not overlap.
/// `exclude_booking_id` lets a booking re-check its own date without
/// colliding with itself.
pub fn check_date(
    conn: &Connection,
    venue_id: &str,
    date: NaiveDate,
    exclude_booking_id: Option<&str>,
) -> anyhow::Result<DayAvailability> {
    let conflicts: Vec<DayConflict> =
        queries::find_day_conflicts(conn, venue_id, date, exclude_booking_id)?
            .into_iter()
            .map(|booking| DayConflict {
                id: booking.id,
                event_name: booking.event_name,
                start_time: booking.start_time.format("%H:%M").to_string(),
                end_time: booking.end_time.format("%H:%M").to_string(),
            })
            .collect();

    Ok(DayAvailability {
        available: conflicts.is_empty(),
        conflicts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Booking, BookingStatus, Lead, LeadSource, LeadStatus, PaymentStatus, VenueSummary,
    };
    use chrono::{NaiveTime, Utc};
    use rust_decimal_macros::dec;

    fn setup_db() -> Connection {
        crate::db::init_db(":memory:").unwrap()
    }

    fn seed_venue(conn: &Connection, id: &str) {
        queries::insert_venue(
            conn,
            &VenueSummary {
                id: id.to_string(),
                owner_id: "owner-1".to_string(),
                name: format!("Venue {id}"),
                capacity_min: 1,
                capacity_max: 500,
            },
        )
        .unwrap();
    }

    fn seed_lead(conn: &Connection, id: &str, venue_id: &str) {
        let now = Utc::now().naive_utc();
        queries::insert_lead(
            conn,
            &Lead {
                id: id.to_string(),
                venue_id: venue_id.to_string(),
                client_name: "Maria Lopez".to_string(),
                client_email: "maria@example.com".to_string(),
                client_phone: "71234567".to_string(),
                event_type: "wedding".to_string(),
                preferred_date: NaiveDate::from_ymd_opt(2026, 10, 10).unwrap(),
                alternative_dates: vec![],
                guest_count: 100,
                estimated_budget: None,
                message: "Looking for a wedding venue in October".to_string(),
                special_requirements: None,
                source: LeadSource::Website,
                status: LeadStatus::New,
                quoted_amount: None,
                final_amount: None,
                commission_rate: dec!(10),
                next_follow_up: None,
                messages: vec![],
                created_at: now,
                updated_at: now,
            },
        )
        .unwrap();
    }

    fn seed_booking(
        conn: &Connection,
        id: &str,
        lead_id: &str,
        venue_id: &str,
        date: NaiveDate,
        status: BookingStatus,
    ) {
        let now = Utc::now().naive_utc();
        queries::insert_booking(
            conn,
            &Booking {
                id: id.to_string(),
                lead_id: lead_id.to_string(),
                venue_id: venue_id.to_string(),
                event_name: "wedding - Maria Lopez".to_string(),
                event_type: "wedding".to_string(),
                event_date: date,
                start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
                guest_count: 100,
                client_name: "Maria Lopez".to_string(),
                client_email: "maria@example.com".to_string(),
                client_phone: "71234567".to_string(),
                gross_amount: dec!(5000),
                commission_rate: dec!(10),
                commission_amount: dec!(500),
                venue_payout: dec!(4500),
                currency: "BOB".to_string(),
                status,
                payment_status: PaymentStatus::Pending,
                special_requirements: None,
                internal_notes: None,
                cancelled_at: None,
                cancellation_reason: None,
                created_at: now,
                updated_at: now,
            },
        )
        .unwrap();
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_date_is_available() {
        let conn = setup_db();
        seed_venue(&conn, "venue-1");

        let result = check_date(&conn, "venue-1", date(2026, 10, 10), None).unwrap();
        assert!(result.available);
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_confirmed_booking_blocks_date() {
        let conn = setup_db();
        seed_venue(&conn, "venue-1");
        seed_lead(&conn, "lead-1", "venue-1");
        seed_booking(
            &conn,
            "booking-1",
            "lead-1",
            "venue-1",
            date(2026, 10, 10),
            BookingStatus::Confirmed,
        );

        let result = check_date(&conn, "venue-1", date(2026, 10, 10), None).unwrap();
        assert!(!result.available);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].id, "booking-1");
        assert_eq!(result.conflicts[0].start_time, "18:00");
        assert_eq!(result.conflicts[0].end_time, "23:00");
    }

    #[test]
    fn test_in_progress_booking_blocks_date() {
        let conn = setup_db();
        seed_venue(&conn, "venue-1");
        seed_lead(&conn, "lead-1", "venue-1");
        seed_booking(
            &conn,
            "booking-1",
            "lead-1",
            "venue-1",
            date(2026, 10, 10),
            BookingStatus::InProgress,
        );

        let result = check_date(&conn, "venue-1", date(2026, 10, 10), None).unwrap();
        assert!(!result.available);
    }

    #[test]
    fn test_finished_bookings_do_not_block() {
        let conn = setup_db();
        seed_venue(&conn, "venue-1");
        seed_lead(&conn, "lead-1", "venue-1");
        seed_lead(&conn, "lead-2", "venue-1");
        seed_booking(
            &conn,
            "booking-1",
            "lead-1",
            "venue-1",
            date(2026, 10, 10),
            BookingStatus::Completed,
        );
        seed_booking(
            &conn,
            "booking-2",
            "lead-2",
            "venue-1",
            date(2026, 10, 10),
            BookingStatus::Cancelled,
        );

        let result = check_date(&conn, "venue-1", date(2026, 10, 10), None).unwrap();
        assert!(result.available);
    }

    #[test]
    fn test_other_dates_and_venues_ignored() {
        let conn = setup_db();
        seed_venue(&conn, "venue-1");
        seed_venue(&conn, "venue-2");
        seed_lead(&conn, "lead-1", "venue-1");
        seed_lead(&conn, "lead-2", "venue-2");
        seed_booking(
            &conn,
            "booking-1",
            "lead-1",
            "venue-1",
            date(2026, 10, 11),
            BookingStatus::Confirmed,
        );
        seed_booking(
            &conn,
            "booking-2",
            "lead-2",
            "venue-2",
            date(2026, 10, 10),
            BookingStatus::Confirmed,
        );

        let result = check_date(&conn, "venue-1", date(2026, 10, 10), None).unwrap();
        assert!(result.available);
    }

    #[test]
    fn test_exclude_skips_own_booking() {
        let conn = setup_db();
        seed_venue(&conn, "venue-1");
        seed_lead(&conn, "lead-1", "venue-1");
        seed_booking(
            &conn,
            "booking-1",
            "lead-1",
            "venue-1",
            date(2026, 10, 10),
            BookingStatus::Confirmed,
        );

        let result =
            check_date(&conn, "venue-1", date(2026, 10, 10), Some("booking-1")).unwrap();
        assert!(result.available);
    }
}
