pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Settings,
    payments::PaymentGateway,
    reconcile::SettlementReconciler,
};
use state::AppState;

pub fn create_app(
    gateway: Arc<dyn PaymentGateway>,
    reconciler: Arc<SettlementReconciler>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(gateway, reconciler, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Fee quoting
        .route("/calculate-fees", post(handlers::fees::calculate_fees))
        // Terminal payment flow
        .route(
            "/create-payment-intent",
            post(handlers::payments::create_payment_intent),
        )
        .route("/register-reader", post(handlers::readers::register_reader))
        .route(
            "/discover-readers",
            post(handlers::readers::discover_readers),
        )
        .route("/process-payment", post(handlers::payments::process_payment))
        .route(
            "/payment-status/:payment_intent_id",
            get(handlers::payments::payment_status),
        )
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}
