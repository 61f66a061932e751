use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api::state::AppState;

pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": "Tallybox POS",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Card-present point of sale for memberships, donations, and raffle tickets",
        "status": "operational",
        "organization": {
            "name": state.settings.organization.name,
            "logo": state.settings.organization.logo,
            "website": state.settings.organization.website,
        },
        "endpoints": {
            "health": "/health",
            "calculate_fees": "/calculate-fees",
            "create_payment_intent": "/create-payment-intent",
            "payment_status": "/payment-status/:payment_intent_id"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
