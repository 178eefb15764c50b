use std::sync::{Arc, Mutex};

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use venuebook::config::AppConfig;
use venuebook::db;
use venuebook::handlers;
use venuebook::services::payments::SimulatedGateway;
use venuebook::services::venues::SqliteVenueDirectory;
use venuebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let state = Arc::new(AppState {
        db: db.clone(),
        config: config.clone(),
        venues: Box::new(SqliteVenueDirectory::new(db.clone())),
        payments: Box::new(SimulatedGateway),
    });

    let app = Router::new()
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
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
