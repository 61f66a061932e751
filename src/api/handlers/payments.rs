use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api::state::AppState,
    domain::{MembershipTier, PaymentRequest, PaymentType},
    error::{AppError, Result},
    payments::{intent_builder, CreatedIntent},
};

/// Wire shape of a charge request. Payment type and membership tier arrive
/// as free strings so unknown values surface as the validation errors the
/// kiosk front end expects, not as a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentDto {
    pub payment_type: String,
    pub membership_type: Option<String>,
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub payer_name: String,
    pub payer_email: Option<String>,
    #[serde(default)]
    pub cover_fees: bool,
    pub raffle_quantity: Option<u32>,
}

impl CreatePaymentIntentDto {
    pub fn into_request(self) -> Result<PaymentRequest> {
        let payment_type: PaymentType = self
            .payment_type
            .parse()
            .map_err(|_| AppError::Validation("Invalid payment type".to_string()))?;

        let membership_tier = match self.membership_type.as_deref() {
            Some(raw) => Some(
                raw.parse::<MembershipTier>()
                    .map_err(|_| AppError::Validation("Invalid membership type".to_string()))?,
            ),
            None => None,
        };

        Ok(PaymentRequest {
            payment_type,
            membership_tier,
            amount_cents: self.amount_cents,
            payer_name: self.payer_name,
            payer_email: self.payer_email,
            cover_fees: self.cover_fees,
            raffle_quantity: self.raffle_quantity,
        })
    }
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(dto): Json<CreatePaymentIntentDto>,
) -> Result<Json<CreatedIntent>> {
    let request = dto.into_request()?;
    let params = intent_builder::build_intent_params(&request, &state.settings.payments)?;

    let created = state.gateway.create_intent(params).await?;

    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct ProcessPaymentDto {
    pub payment_intent_id: Option<String>,
    pub reader_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProcessPaymentResponse {
    pub status: &'static str,
    pub payment_intent_id: String,
}

pub async fn process_payment(
    State(state): State<AppState>,
    Json(dto): Json<ProcessPaymentDto>,
) -> Result<Json<ProcessPaymentResponse>> {
    let (Some(intent_id), Some(reader_id)) = (dto.payment_intent_id, dto.reader_id) else {
        return Err(AppError::BadRequest(
            "Missing payment_intent_id or reader_id".to_string(),
        ));
    };

    // Sanity-check the intent exists before handing it to the reader.
    state.gateway.retrieve_intent(&intent_id).await?;
    state.gateway.process_on_reader(&reader_id, &intent_id).await?;

    Ok(Json(ProcessPaymentResponse {
        status: "processing",
        payment_intent_id: intent_id,
    }))
}

pub async fn payment_status(
    State(state): State<AppState>,
    Path(payment_intent_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let snapshot = state.reconciler.check(&payment_intent_id).await?;

    Ok(Json(json!({
        "status": snapshot.raw_status,
        "amount": snapshot.amount_cents,
        "metadata": snapshot.metadata,
    })))
}
