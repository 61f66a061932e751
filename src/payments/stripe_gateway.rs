use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use stripe::{
    Client, CreatePaymentIntent, Currency, PaymentIntent, PaymentIntentCaptureMethod,
    PaymentIntentId, PaymentIntentStatus, UpdatePaymentIntent,
};

use crate::{
    domain::{IntentSnapshot, IntentStatus},
    error::{AppError, Result},
};

use super::{CreateIntentParams, CreatedIntent, PaymentGateway, Reader};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe-backed gateway. Payment intents go through async-stripe; the
/// Terminal reader endpoints go through reqwest because async-stripe 0.39
/// does not generate the reader action calls (process_payment_intent).
pub struct StripeGateway {
    client: Client,
    http: reqwest::Client,
    secret_key: String,
    location_id: String,
}

impl StripeGateway {
    pub fn new(secret_key: String, location_id: String) -> Self {
        Self {
            client: Client::new(secret_key.clone()),
            http: reqwest::Client::new(),
            secret_key,
            location_id,
        }
    }

    fn parse_intent_id(intent_id: &str) -> Result<PaymentIntentId> {
        intent_id
            .parse()
            .map_err(|_| AppError::Validation("Invalid payment intent id".to_string()))
    }

    async fn terminal_post(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let response = self
            .http
            .post(format!("{}{}", STRIPE_API_BASE, path))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Stripe terminal error: {}", e)))?;

        decode_terminal_response(response).await
    }

    async fn terminal_get(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(format!("{}{}", STRIPE_API_BASE, path))
            .basic_auth(&self.secret_key, None::<&str>)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Stripe terminal error: {}", e)))?;

        decode_terminal_response(response).await
    }
}

async fn decode_terminal_response(response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AppError::External(format!("Stripe terminal error: {}", e)))?;

    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown Stripe error")
            .to_string();
        return Err(AppError::External(format!("Stripe error: {}", message)));
    }

    Ok(body)
}

#[derive(Debug, Deserialize)]
struct ReaderResource {
    id: String,
    label: Option<String>,
    status: Option<String>,
}

impl From<ReaderResource> for Reader {
    fn from(resource: ReaderResource) -> Self {
        Reader {
            id: resource.id,
            label: resource.label.unwrap_or_else(|| "Stripe Reader".to_string()),
            status: resource.status.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Stripe reports no dedicated failure status on the intent itself; a
/// declined card drops the intent back to requires_payment_method with a
/// last_payment_error attached. That combination is our payment_failed state.
fn map_status(status: PaymentIntentStatus, has_payment_error: bool) -> (IntentStatus, &'static str) {
    match status {
        PaymentIntentStatus::Succeeded => (IntentStatus::Succeeded, "succeeded"),
        PaymentIntentStatus::Canceled => (IntentStatus::Canceled, "canceled"),
        PaymentIntentStatus::RequiresPaymentMethod if has_payment_error => {
            (IntentStatus::PaymentFailed, "payment_failed")
        }
        PaymentIntentStatus::RequiresPaymentMethod => {
            (IntentStatus::Pending, "requires_payment_method")
        }
        PaymentIntentStatus::RequiresConfirmation => {
            (IntentStatus::Pending, "requires_confirmation")
        }
        PaymentIntentStatus::RequiresAction => (IntentStatus::Pending, "requires_action"),
        PaymentIntentStatus::RequiresCapture => (IntentStatus::Pending, "requires_capture"),
        PaymentIntentStatus::Processing => (IntentStatus::Pending, "processing"),
    }
}

fn snapshot_from(intent: PaymentIntent) -> IntentSnapshot {
    let (status, raw_status) = map_status(intent.status, intent.last_payment_error.is_some());
    IntentSnapshot {
        id: intent.id.to_string(),
        status,
        raw_status: raw_status.to_string(),
        amount_cents: intent.amount,
        metadata: intent.metadata,
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, params: CreateIntentParams) -> Result<CreatedIntent> {
        let mut create = CreatePaymentIntent::new(params.amount_cents, Currency::USD);
        create.payment_method_types = Some(vec!["card_present".to_string()]);
        create.capture_method = Some(PaymentIntentCaptureMethod::Automatic);
        create.description = Some(&params.description);
        create.metadata = Some(params.metadata.clone());

        let intent = PaymentIntent::create(&self.client, create)
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        let client_secret = intent
            .client_secret
            .clone()
            .ok_or_else(|| AppError::External("No client secret returned".to_string()))?;

        tracing::info!(
            "Created PaymentIntent {} for amount {}",
            intent.id,
            params.amount_cents
        );

        Ok(CreatedIntent {
            id: intent.id.to_string(),
            client_secret,
        })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentSnapshot> {
        let id = Self::parse_intent_id(intent_id)?;
        let intent = PaymentIntent::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        Ok(snapshot_from(intent))
    }

    async fn update_intent_metadata(
        &self,
        intent_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        let id = Self::parse_intent_id(intent_id)?;
        PaymentIntent::update(
            &self.client,
            &id,
            UpdatePaymentIntent {
                metadata: Some(metadata),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| AppError::External(format!("Stripe error: {}", e)))?;

        Ok(())
    }

    async fn list_readers(&self) -> Result<Vec<Reader>> {
        let body = self
            .terminal_get("/terminal/readers", &[("location", &self.location_id)])
            .await?;

        let resources: Vec<ReaderResource> = serde_json::from_value(
            body.get("data").cloned().unwrap_or_default(),
        )
        .map_err(|e| AppError::External(format!("Stripe terminal error: {}", e)))?;

        Ok(resources.into_iter().map(Into::into).collect())
    }

    async fn register_reader(&self, registration_code: &str) -> Result<Reader> {
        let body = self
            .terminal_post(
                "/terminal/readers",
                &[
                    ("registration_code", registration_code),
                    ("location", &self.location_id),
                ],
            )
            .await?;

        let resource: ReaderResource = serde_json::from_value(body)
            .map_err(|e| AppError::External(format!("Stripe terminal error: {}", e)))?;

        tracing::info!("Registered terminal reader {}", resource.id);

        Ok(resource.into())
    }

    async fn process_on_reader(&self, reader_id: &str, intent_id: &str) -> Result<()> {
        self.terminal_post(
            &format!("/terminal/readers/{}/process_payment_intent", reader_id),
            &[("payment_intent", intent_id)],
        )
        .await?;

        tracing::info!("Processing payment {} on reader {}", intent_id, reader_id);

        Ok(())
    }
}
