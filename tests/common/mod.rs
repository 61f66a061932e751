//! Hand-rolled fakes for the gateway, mailer, and ledger seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tallybox::{
    domain::{IntentSnapshot, IntentStatus},
    error::{AppError, Result},
    ledger::{TransactionLedger, TransactionLogRecord},
    mail::Mailer,
    payments::{CreateIntentParams, CreatedIntent, PaymentGateway, Reader},
};

pub fn snapshot(
    id: &str,
    status: IntentStatus,
    amount_cents: i64,
    metadata: &[(&str, &str)],
) -> IntentSnapshot {
    IntentSnapshot {
        id: id.to_string(),
        status,
        raw_status: status.as_str().to_string(),
        amount_cents,
        metadata: metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// In-memory stand-in for the payment processor. `update_intent_metadata`
/// replaces the stored map wholesale, like the real modify call, and also
/// refreshes the stored snapshot's derived flags for subsequent retrievals.
#[derive(Default)]
pub struct FakeGateway {
    pub intents: Mutex<HashMap<String, IntentSnapshot>>,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub fail_updates: AtomicBool,
    pub last_create: Mutex<Option<CreateIntentParams>>,
}

impl FakeGateway {
    pub fn with_intent(snapshot: IntentSnapshot) -> Self {
        let gateway = Self::default();
        gateway
            .intents
            .lock()
            .unwrap()
            .insert(snapshot.id.clone(), snapshot);
        gateway
    }

    pub fn stored_metadata(&self, intent_id: &str) -> HashMap<String, String> {
        self.intents
            .lock()
            .unwrap()
            .get(intent_id)
            .map(|s| s.metadata.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_intent(&self, params: CreateIntentParams) -> Result<CreatedIntent> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_create.lock().unwrap() = Some(params.clone());

        let id = format!("pi_fake_{}", self.create_calls.load(Ordering::SeqCst));
        self.intents.lock().unwrap().insert(
            id.clone(),
            IntentSnapshot {
                id: id.clone(),
                status: IntentStatus::Pending,
                raw_status: "requires_payment_method".to_string(),
                amount_cents: params.amount_cents,
                metadata: params.metadata,
            },
        );

        Ok(CreatedIntent {
            client_secret: format!("{}_secret", id),
            id,
        })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentSnapshot> {
        self.intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No such intent: {}", intent_id)))
    }

    async fn update_intent_metadata(
        &self,
        intent_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::External("simulated modify failure".to_string()));
        }

        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stored) = self.intents.lock().unwrap().get_mut(intent_id) {
            stored.metadata = metadata;
        }
        Ok(())
    }

    async fn list_readers(&self) -> Result<Vec<Reader>> {
        Ok(vec![Reader {
            id: "tmr_fake".to_string(),
            label: "Front Desk".to_string(),
            status: "online".to_string(),
        }])
    }

    async fn register_reader(&self, registration_code: &str) -> Result<Reader> {
        Ok(Reader {
            id: format!("tmr_{}", registration_code),
            label: "Front Desk".to_string(),
            status: "online".to_string(),
        })
    }

    async fn process_on_reader(&self, _reader_id: &str, intent_id: &str) -> Result<()> {
        self.retrieve_intent(intent_id).await.map(|_| ())
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub html: bool,
}

#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail_sends: AtomicBool,
}

impl FakeMailer {
    pub fn sent_to(&self, to: &str) -> Vec<SentMail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == to)
            .cloned()
            .collect()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, to: &str, subject: &str, body: &str, html: bool) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(AppError::External("simulated SMTP failure".to_string()));
        }

        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            html,
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    pub rows: Mutex<Vec<TransactionLogRecord>>,
}

impl MemoryLedger {
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.status.clone())
            .collect()
    }
}

impl TransactionLedger for MemoryLedger {
    fn append(&self, record: &TransactionLogRecord) -> Result<()> {
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }
}
