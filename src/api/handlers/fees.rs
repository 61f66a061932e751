use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::state::AppState,
    domain::{fees::FeeQuote, MembershipTier, PaymentRequest, PaymentType},
    error::{AppError, Result},
    payments::intent_builder,
};

#[derive(Debug, Deserialize)]
pub struct CalculateFeesDto {
    pub payment_type: String,
    pub membership_type: Option<String>,
    pub amount_cents: Option<i64>,
}

/// Quote the processing fee for a prospective payment so the kiosk can offer
/// the fee pass-through checkbox before anything is charged.
pub async fn calculate_fees(
    State(state): State<AppState>,
    Json(dto): Json<CalculateFeesDto>,
) -> Result<Json<serde_json::Value>> {
    let payment_type: PaymentType = dto
        .payment_type
        .parse()
        .map_err(|_| AppError::Validation("Invalid payment type".to_string()))?;

    let membership_tier = match dto.membership_type.as_deref() {
        Some(raw) => Some(
            raw.parse::<MembershipTier>()
                .map_err(|_| AppError::Validation("Invalid membership type".to_string()))?,
        ),
        None => None,
    };

    let request = PaymentRequest {
        payment_type,
        membership_tier,
        amount_cents: dto.amount_cents,
        payer_name: String::new(),
        payer_email: None,
        cover_fees: false,
        raffle_quantity: None,
    };

    let base_amount =
        intent_builder::resolve_base_amount(&request, &state.settings.payments)?;
    let quote = FeeQuote::for_amount(base_amount);

    Ok(Json(json!({
        "base_amount_cents": quote.base_amount_cents,
        "base_amount_dollars": quote.base_amount_cents as f64 / 100.0,
        "fee_amount_cents": quote.fee_amount_cents,
        "fee_amount_dollars": quote.fee_amount_cents as f64 / 100.0,
        "total_with_fees_cents": quote.total_with_fees_cents,
        "total_with_fees_dollars": quote.total_with_fees_cents as f64 / 100.0,
    })))
}
