use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, patch, post};
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tower::ServiceExt;

use venuebook::config::AppConfig;
use venuebook::db::{self, queries};
use venuebook::handlers;
use venuebook::models::{Booking, VenueSummary};
use venuebook::services::payments::{PaymentDetails, PaymentGateway, PaymentOutcome};
use venuebook::services::venues::SqliteVenueDirectory;
use venuebook::state::AppState;

// ── Mock Providers ──

struct ApprovingGateway {
    charged: Arc<Mutex<Vec<String>>>,
}

impl ApprovingGateway {
    fn new() -> Self {
        Self {
            charged: Arc::new(Mutex::new(vec![])),
        }
    }
}

#[async_trait]
impl PaymentGateway for ApprovingGateway {
    async fn process_payment(
        &self,
        booking: &Booking,
        _details: &PaymentDetails,
    ) -> anyhow::Result<PaymentOutcome> {
        self.charged.lock().unwrap().push(booking.id.clone());
        Ok(PaymentOutcome {
            success: true,
            transaction_id: Some(format!("TXN_TEST_{}", booking.id)),
            error_code: None,
        })
    }
}

struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn process_payment(
        &self,
        _booking: &Booking,
        _details: &PaymentDetails,
    ) -> anyhow::Result<PaymentOutcome> {
        Ok(PaymentOutcome {
            success: false,
            transaction_id: None,
            error_code: Some("card_declined".to_string()),
        })
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        commission_basic_rate: dec!(10),
        commission_min_fee: dec!(100),
        currency: "BOB".to_string(),
    }
}

fn test_state_with(payments: Box<dyn PaymentGateway>) -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    let db = Arc::new(Mutex::new(conn));
    Arc::new(AppState {
        db: db.clone(),
        config: test_config(),
        venues: Box::new(SqliteVenueDirectory::new(db.clone())),
        payments,
    })
}

fn test_state() -> Arc<AppState> {
    test_state_with(Box::new(ApprovingGateway::new()))
}

fn seed_venue(state: &Arc<AppState>, id: &str, owner_id: &str, min: i32, max: i32) {
    let db = state.db.lock().unwrap();
    queries::insert_venue(
        &db,
        &VenueSummary {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: format!("Venue {id}"),
            capacity_min: min,
            capacity_max: max,
        },
    )
    .unwrap();
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/leads", post(handlers::leads::create_lead))
        .route("/api/leads", get(handlers::leads::list_leads))
        .route("/api/leads/:id", get(handlers::leads::get_lead))
        .route(
            "/api/leads/:id/messages",
            post(handlers::leads::append_message),
        )
        .route(
            "/api/leads/:id/read",
            post(handlers::leads::mark_messages_read),
        )
        .route(
            "/api/leads/:id/status",
            patch(handlers::leads::set_lead_status),
        )
        .route(
            "/api/venues/:venue_id/leads",
            get(handlers::leads::list_venue_leads),
        )
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route(
            "/api/bookings/from-lead/:lead_id",
            post(handlers::bookings::convert_lead),
        )
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/status",
            patch(handlers::bookings::set_booking_status),
        )
        .route(
            "/api/bookings/:id/notes",
            patch(handlers::bookings::update_notes),
        )
        .route(
            "/api/bookings/:id/payment",
            post(handlers::bookings::record_payment),
        )
        .route(
            "/api/availability",
            get(handlers::bookings::check_availability),
        )
        .route("/api/commission/quote", post(handlers::commission::quote))
        .route(
            "/api/commission/config",
            get(handlers::commission::get_config),
        )
        .route("/api/reports/revenue", get(handlers::reports::revenue))
        .route(
            "/api/reports/pending-commissions",
            get(handlers::reports::pending_commissions),
        )
        .route(
            "/api/reports/projection",
            get(handlers::reports::projection),
        )
        .with_state(state)
}

const OWNER: (&str, &str) = ("owner-1", "provider");
const OTHER_OWNER: (&str, &str) = ("owner-2", "provider");
const ADMIN: (&str, &str) = ("admin-1", "admin");
const CLIENT: (&str, &str) = ("client-1", "client");

fn request(
    method: &str,
    uri: &str,
    actor: Option<(&str, &str)>,
    body: Option<&serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder
            .header("x-actor-id", id)
            .header("x-actor-role", role);
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(
    state: &Arc<AppState>,
    req: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn decimal(value: &serde_json::Value) -> Decimal {
    serde_json::from_value(value.clone()).unwrap()
}

fn future(days: i64) -> String {
    (Utc::now().date_naive() + chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn lead_body(venue_id: &str) -> serde_json::Value {
    serde_json::json!({
        "venue_id": venue_id,
        "client_name": "Maria Lopez",
        "client_email": "maria@example.com",
        "client_phone": "71234567",
        "event_type": "wedding",
        "preferred_date": future(90),
        "guest_count": 100,
        "message": "Looking for a wedding venue in October"
    })
}

fn convert_body(date: &str) -> serde_json::Value {
    serde_json::json!({
        "event_date": date,
        "start_time": "18:00",
        "end_time": "23:00",
        "gross_amount": 5000,
        "commission_rate": 10
    })
}

/// Intake a lead and walk it to `quoted` so it is convertible.
async fn quoted_lead(state: &Arc<AppState>, venue_id: &str, owner: (&str, &str)) -> String {
    let (status, lead) = send(
        state,
        request("POST", "/api/leads", None, Some(&lead_body(venue_id))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let lead_id = lead["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        state,
        request(
            "PATCH",
            &format!("/api/leads/{lead_id}/status"),
            Some(owner),
            Some(&serde_json::json!({"status": "quoted", "quoted_amount": 5000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    lead_id
}

async fn converted_booking(state: &Arc<AppState>, venue_id: &str, date: &str) -> String {
    let lead_id = quoted_lead(state, venue_id, OWNER).await;
    let (status, booking) = send(
        state,
        request(
            "POST",
            &format!("/api/bookings/from-lead/{lead_id}"),
            Some(OWNER),
            Some(&convert_body(date)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    booking["id"].as_str().unwrap().to_string()
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = send(&state, request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

// ── Lead Intake ──

#[tokio::test]
async fn test_lead_intake() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);

    let (status, json) = send(
        &state,
        request("POST", "/api/leads", None, Some(&lead_body("venue-1"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "new");
    assert_eq!(json["source"], "website");
    assert_eq!(json["guest_count"], 100);
    assert_eq!(decimal(&json["commission_rate"]), dec!(10));
    assert!(json["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_lead_intake_validation() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);

    // Over capacity: the message names both numbers.
    let mut body = lead_body("venue-1");
    body["guest_count"] = serde_json::json!(250);
    let (status, json) = send(&state, request("POST", "/api/leads", None, Some(&body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("250"));
    assert!(message.contains("200"));

    let mut body = lead_body("venue-1");
    body["preferred_date"] = serde_json::json!(
        (Utc::now().date_naive() - chrono::Duration::days(3))
            .format("%Y-%m-%d")
            .to_string()
    );
    let (status, json) = send(&state, request("POST", "/api/leads", None, Some(&body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let mut body = lead_body("venue-1");
    body["client_email"] = serde_json::json!("not-an-email");
    let (status, _) = send(&state, request("POST", "/api/leads", None, Some(&body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(
        &state,
        request("POST", "/api/leads", None, Some(&lead_body("missing"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

// ── Full Lifecycle ──

#[tokio::test]
async fn test_full_booking_flow() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);

    // Client inquiry arrives.
    let (status, lead) = send(
        &state,
        request("POST", "/api/leads", None, Some(&lead_body("venue-1"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lead["status"], "new");
    let lead_id = lead["id"].as_str().unwrap().to_string();

    // First provider reply advances the funnel.
    let (status, lead) = send(
        &state,
        request(
            "POST",
            &format!("/api/leads/{lead_id}/messages"),
            Some(OWNER),
            Some(&serde_json::json!({"body": "The date is open, sending details."})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["status"], "contacted");

    // Quote, then mark won.
    let (status, lead) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/leads/{lead_id}/status"),
            Some(OWNER),
            Some(&serde_json::json!({"status": "quoted", "quoted_amount": 5000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["status"], "quoted");
    assert_eq!(decimal(&lead["quoted_amount"]), dec!(5000));

    let (status, lead) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/leads/{lead_id}/status"),
            Some(OWNER),
            Some(&serde_json::json!({"status": "won"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["status"], "won");

    // Convert: money split and both state machines at their initial states.
    let event_date = future(60);
    let (status, booking) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/from-lead/{lead_id}"),
            Some(OWNER),
            Some(&convert_body(&event_date)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&booking["gross_amount"]), dec!(5000));
    assert_eq!(decimal(&booking["commission_amount"]), dec!(500));
    assert_eq!(decimal(&booking["venue_payout"]), dec!(4500));
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["payment_status"], "pending");
    assert_eq!(booking["event_name"], "wedding - Maria Lopez");
    assert_eq!(booking["currency"], "BOB");

    // The lead finished at won with the final amount recorded.
    let (status, lead) = send(
        &state,
        request("GET", &format!("/api/leads/{lead_id}"), Some(OWNER), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["status"], "won");
    assert_eq!(decimal(&lead["final_amount"]), dec!(5000));

    // A lead converts exactly once.
    let (status, json) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/from-lead/{lead_id}"),
            Some(OWNER),
            Some(&convert_body(&future(61))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
}

#[tokio::test]
async fn test_double_booking_rejected() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let first = quoted_lead(&state, "venue-1", OWNER).await;
    let second = quoted_lead(&state, "venue-1", OWNER).await;

    let date = future(60);
    let (status, _) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/from-lead/{first}"),
            Some(OWNER),
            Some(&convert_body(&date)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/from-lead/{second}"),
            Some(OWNER),
            Some(&convert_body(&date)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
    assert!(json["message"].as_str().unwrap().contains("already booked"));
}

// ── Booking State Machine ──

#[tokio::test]
async fn test_terminal_states_reject_all_transitions() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let booking_id = converted_booking(&state, "venue-1", &future(60)).await;

    for next in ["in_progress", "completed"] {
        let (status, _) = send(
            &state,
            request(
                "PATCH",
                &format!("/api/bookings/{booking_id}/status"),
                Some(OWNER),
                Some(&serde_json::json!({"status": next})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    for next in ["confirmed", "in_progress", "completed", "cancelled"] {
        let (status, json) = send(
            &state,
            request(
                "PATCH",
                &format!("/api/bookings/{booking_id}/status"),
                Some(OWNER),
                Some(&serde_json::json!({
                    "status": next,
                    "cancellation_reason": "too late"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "allowed {next}");
        assert_eq!(json["error"], "invalid_state");
    }
}

#[tokio::test]
async fn test_skipping_in_progress_rejected() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let booking_id = converted_booking(&state, "venue-1", &future(60)).await;

    let (status, json) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/status"),
            Some(OWNER),
            Some(&serde_json::json!({"status": "completed"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "invalid_state");
}

#[tokio::test]
async fn test_cancellation() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let booking_id = converted_booking(&state, "venue-1", &future(60)).await;

    let (status, json) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/status"),
            Some(OWNER),
            Some(&serde_json::json!({"status": "cancelled", "cancellation_reason": "  "})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let (status, booking) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/status"),
            Some(OWNER),
            Some(&serde_json::json!({
                "status": "cancelled",
                "cancellation_reason": "client changed plans"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["status"], "cancelled");
    assert_eq!(booking["payment_status"], "refunded");
    assert_eq!(booking["cancellation_reason"], "client changed plans");
    assert!(!booking["cancelled_at"].is_null());
}

// ── Payments ──

#[tokio::test]
async fn test_record_payment() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let booking_id = converted_booking(&state, "venue-1", &future(60)).await;

    let (status, receipt) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/{booking_id}/payment"),
            Some(OWNER),
            Some(&serde_json::json!({"method": "card"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["success"], true);
    assert!(receipt["transaction_id"]
        .as_str()
        .unwrap()
        .starts_with("TXN_"));
    assert_eq!(receipt["payment_status"], "completed");
    assert_eq!(receipt["booking_status"], "in_progress");

    let (_, booking) = send(
        &state,
        request("GET", &format!("/api/bookings/{booking_id}"), None, None),
    )
    .await;
    assert_eq!(booking["payment_status"], "completed");
    assert_eq!(booking["status"], "in_progress");

    // Paying twice is a state error, not a second charge.
    let (status, json) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/{booking_id}/payment"),
            Some(OWNER),
            Some(&serde_json::json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "invalid_state");
}

#[tokio::test]
async fn test_declined_payment_changes_nothing() {
    let state = test_state_with(Box::new(DecliningGateway));
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let booking_id = converted_booking(&state, "venue-1", &future(60)).await;

    let (status, receipt) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/{booking_id}/payment"),
            Some(OWNER),
            Some(&serde_json::json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["success"], false);
    assert_eq!(receipt["error_code"], "card_declined");
    assert_eq!(receipt["payment_status"], "pending");
    assert_eq!(receipt["booking_status"], "confirmed");

    let (_, booking) = send(
        &state,
        request("GET", &format!("/api/bookings/{booking_id}"), None, None),
    )
    .await;
    assert_eq!(booking["payment_status"], "pending");
    assert_eq!(booking["status"], "confirmed");
}

// ── Availability ──

#[tokio::test]
async fn test_availability_endpoint() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let date = future(60);

    let (status, json) = send(
        &state,
        request(
            "GET",
            &format!("/api/availability?venue_id=venue-1&date={date}"),
            Some(OWNER),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["available"], true);

    let booking_id = converted_booking(&state, "venue-1", &date).await;

    let (_, json) = send(
        &state,
        request(
            "GET",
            &format!("/api/availability?venue_id=venue-1&date={date}"),
            Some(OWNER),
            None,
        ),
    )
    .await;
    assert_eq!(json["available"], false);
    let conflicts = json["conflicts"].as_array().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["id"], booking_id.as_str());
    assert_eq!(conflicts[0]["start_time"], "18:00");
    assert_eq!(conflicts[0]["end_time"], "23:00");

    let (_, json) = send(
        &state,
        request(
            "GET",
            &format!(
                "/api/availability?venue_id=venue-1&date={date}&exclude_booking_id={booking_id}"
            ),
            Some(OWNER),
            None,
        ),
    )
    .await;
    assert_eq!(json["available"], true);
}

// ── Commission Endpoints ──

#[tokio::test]
async fn test_commission_quote() {
    let state = test_state();

    let (status, json) = send(
        &state,
        request(
            "POST",
            "/api/commission/quote",
            Some(OWNER),
            Some(&serde_json::json!({"gross_amount": 1000, "commission_rate": 10})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["commission"]), dec!(100));
    assert_eq!(decimal(&json["payout"]), dec!(900));

    // Small booking hits the minimum fee.
    let (_, json) = send(
        &state,
        request(
            "POST",
            "/api/commission/quote",
            Some(OWNER),
            Some(&serde_json::json!({"gross_amount": 500})),
        ),
    )
    .await;
    assert_eq!(decimal(&json["commission"]), dec!(100));
    assert_eq!(decimal(&json["payout"]), dec!(400));

    let (status, _) = send(
        &state,
        request(
            "POST",
            "/api/commission/quote",
            Some(CLIENT),
            Some(&serde_json::json!({"gross_amount": 1000})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_commission_config_is_admin_only() {
    let state = test_state();

    let (status, _) = send(
        &state,
        request("GET", "/api/commission/config", Some(OWNER), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
        &state,
        request("GET", "/api/commission/config", Some(ADMIN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["basic_rate"]), dec!(10));
    assert_eq!(decimal(&json["min_fee"]), dec!(100));
    assert_eq!(json["currency"], "BOB");
}

// ── Reports ──

async fn paid_booking(state: &Arc<AppState>, venue_id: &str, date: &str) -> String {
    let booking_id = converted_booking(state, venue_id, date).await;
    let (status, receipt) = send(
        state,
        request(
            "POST",
            &format!("/api/bookings/{booking_id}/payment"),
            Some(ADMIN),
            Some(&serde_json::json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["success"], true);
    booking_id
}

#[tokio::test]
async fn test_revenue_report() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    seed_venue(&state, "venue-2", "owner-2", 50, 200);

    paid_booking(&state, "venue-1", &future(35)).await;
    // Unpaid: on the books but not settled.
    converted_booking(&state, "venue-1", &future(36)).await;
    // Another owner entirely.
    let foreign_lead = quoted_lead(&state, "venue-2", OTHER_OWNER).await;
    let (status, booking) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/from-lead/{foreign_lead}"),
            Some(OTHER_OWNER),
            Some(&convert_body(&future(35))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/{}/payment", booking["id"].as_str().unwrap()),
            Some(OTHER_OWNER),
            Some(&serde_json::json!({})),
        ),
    )
    .await;

    let (status, report) = send(
        &state,
        request("GET", "/api/reports/revenue", Some(OWNER), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totals"]["bookings"], 1);
    assert_eq!(decimal(&report["totals"]["gross"]), dec!(5000));
    assert_eq!(decimal(&report["totals"]["commission"]), dec!(500));
    assert_eq!(decimal(&report["totals"]["payout"]), dec!(4500));
    assert_eq!(report["by_month"].as_array().unwrap().len(), 1);
    assert_eq!(report["by_venue"].as_array().unwrap().len(), 1);
    assert_eq!(decimal(&report["by_venue"][0]["average_gross"]), dec!(5000));

    // Admins can read any owner's report.
    let (status, report) = send(
        &state,
        request(
            "GET",
            "/api/reports/revenue?owner_id=owner-2",
            Some(ADMIN),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totals"]["bookings"], 1);

    // No venues, no data: zeros rather than an error.
    let (status, report) = send(
        &state,
        request(
            "GET",
            "/api/reports/revenue",
            Some(("owner-9", "provider")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totals"]["bookings"], 0);
    assert_eq!(decimal(&report["totals"]["gross"]), dec!(0));
}

#[tokio::test]
async fn test_pending_commissions_report() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);

    let booking_id = paid_booking(&state, "venue-1", &future(35)).await;
    let (status, _) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/bookings/{booking_id}/status"),
            Some(OWNER),
            Some(&serde_json::json!({"status": "completed"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &state,
        request("GET", "/api/reports/pending-commissions", Some(OWNER), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, due) = send(
        &state,
        request("GET", "/api/reports/pending-commissions", Some(ADMIN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(due["bookings"], 1);
    assert_eq!(decimal(&due["total_commissions"]), dec!(500));
    assert_eq!(due["owners"][0]["owner_id"], "owner-1");
    assert_eq!(
        due["owners"][0]["items"][0]["booking_id"],
        booking_id.as_str()
    );
}

#[tokio::test]
async fn test_projection_report() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);

    converted_booking(&state, "venue-1", &future(30)).await;
    converted_booking(&state, "venue-1", &future(200)).await;

    let (status, report) = send(
        &state,
        request("GET", "/api/reports/projection", Some(OWNER), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totals"]["bookings"], 1);
    assert_eq!(decimal(&report["totals"]["gross"]), dec!(5000));

    let (status, json) = send(
        &state,
        request(
            "GET",
            "/api/reports/projection?months=13",
            Some(OWNER),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

// ── Authorization ──

#[tokio::test]
async fn test_actor_headers_required() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let lead_id = quoted_lead(&state, "venue-1", OWNER).await;

    let (status, json) = send(
        &state,
        request("GET", &format!("/api/leads/{lead_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");

    let (status, _) = send(
        &state,
        request(
            "GET",
            &format!("/api/leads/{lead_id}"),
            Some(("owner-1", "superuser")),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_foreign_provider_cannot_touch_lead() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let lead_id = quoted_lead(&state, "venue-1", OWNER).await;

    let (status, json) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/leads/{lead_id}/status"),
            Some(OTHER_OWNER),
            Some(&serde_json::json!({"status": "lost"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");

    let (status, _) = send(
        &state,
        request(
            "POST",
            &format!("/api/bookings/from-lead/{lead_id}"),
            Some(OTHER_OWNER),
            Some(&convert_body(&future(60))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Messaging ──

#[tokio::test]
async fn test_mark_messages_read() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let (_, lead) = send(
        &state,
        request("POST", "/api/leads", None, Some(&lead_body("venue-1"))),
    )
    .await;
    let lead_id = lead["id"].as_str().unwrap();

    send(
        &state,
        request(
            "POST",
            &format!("/api/leads/{lead_id}/messages"),
            Some(CLIENT),
            Some(&serde_json::json!({"body": "Is the date free?"})),
        ),
    )
    .await;

    let (status, lead) = send(
        &state,
        request(
            "POST",
            &format!("/api/leads/{lead_id}/read"),
            Some(OWNER),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["messages"][0]["read"], true);
}

// ── Lookup Failures ──

#[tokio::test]
async fn test_unknown_ids_return_not_found() {
    let state = test_state();

    let (status, json) = send(&state, request("GET", "/api/bookings/nope", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");

    let (status, _) = send(&state, request("GET", "/api/leads/nope", Some(ADMIN), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &state,
        request(
            "PATCH",
            "/api/leads/nope/status",
            Some(ADMIN),
            Some(&serde_json::json!({"status": "sideways"})),
        ),
    )
    .await;
    // The lead is checked before the status value.
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_unknown_status_value_is_invalid_state() {
    let state = test_state();
    seed_venue(&state, "venue-1", "owner-1", 50, 200);
    let lead_id = quoted_lead(&state, "venue-1", OWNER).await;

    let (status, json) = send(
        &state,
        request(
            "PATCH",
            &format!("/api/leads/{lead_id}/status"),
            Some(OWNER),
            Some(&serde_json::json!({"status": "archived"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "invalid_state");
}
