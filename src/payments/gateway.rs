use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::{domain::IntentSnapshot, error::Result};

/// Processor-facing creation call for a card-present charge. Currency is
/// always USD and capture is automatic; the builder owns amount, description
/// and metadata assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIntentParams {
    pub amount_cents: i64,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedIntent {
    pub id: String,
    pub client_secret: String,
}

/// A physical card reader at the configured terminal location.
#[derive(Debug, Clone, Serialize)]
pub struct Reader {
    pub id: String,
    pub label: String,
    pub status: String,
}

/// Seam to the external payment processor. The remote intent's lifecycle is
/// owned entirely by the processor; this trait only creates, observes, and
/// annotates it.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, params: CreateIntentParams) -> Result<CreatedIntent>;

    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentSnapshot>;

    /// Full metadata replacement on the remote intent. Callers must merge the
    /// existing map themselves so pre-existing keys survive.
    async fn update_intent_metadata(
        &self,
        intent_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()>;

    async fn list_readers(&self) -> Result<Vec<Reader>>;

    async fn register_reader(&self, registration_code: &str) -> Result<Reader>;

    /// Hand an intent to a reader for card presentment.
    async fn process_on_reader(&self, reader_id: &str, intent_id: &str) -> Result<()>;
}
