use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    domain::{metadata_keys, IntentSnapshot, IntentStatus},
    error::Result,
    ledger::{TransactionLedger, TransactionLogRecord},
    notify::{NotificationDispatcher, SettlementEvent},
    payments::PaymentGateway,
};

/// Drives the at-most-once email dispatch for settled intents and the audit
/// trail for every observed terminal state.
///
/// The idempotency gate is a check-then-act on the remote metadata with no
/// lock around it: two pollers observing the same just-succeeded intent
/// before either write-back lands can both send. With one terminal and
/// infrequent polling that race is accepted rather than engineered away.
pub struct SettlementReconciler {
    gateway: Arc<dyn PaymentGateway>,
    dispatcher: NotificationDispatcher,
    ledger: Arc<dyn TransactionLedger>,
}

impl SettlementReconciler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: NotificationDispatcher,
        ledger: Arc<dyn TransactionLedger>,
    ) -> Self {
        Self {
            gateway,
            dispatcher,
            ledger,
        }
    }

    /// Look up the intent and react to its processor-reported status.
    /// Returns the snapshot as retrieved; the idempotency markers land on
    /// the remote object, not in this response.
    pub async fn check(&self, intent_id: &str) -> Result<IntentSnapshot> {
        let snapshot = self.gateway.retrieve_intent(intent_id).await?;

        match snapshot.status {
            IntentStatus::Succeeded if !snapshot.emails_sent() => {
                self.handle_first_success(&snapshot).await;
            }
            IntentStatus::Succeeded => {
                // Already flagged; idempotent no-op.
            }
            IntentStatus::Canceled | IntentStatus::PaymentFailed => {
                // Unlike the success path this is not gated, so every poll of
                // a canceled or failed intent appends another row.
                self.append_audit_row(&snapshot, snapshot.status);
            }
            IntentStatus::Pending => {}
        }

        Ok(snapshot)
    }

    async fn handle_first_success(&self, snapshot: &IntentSnapshot) {
        self.append_audit_row(snapshot, IntentStatus::Succeeded);

        let event = SettlementEvent::from_snapshot(snapshot);

        let receipt_sent = if event.payer_email.is_some() {
            self.dispatcher.send_receipt(&event).await
        } else {
            false
        };
        let notification_sent = self.dispatcher.send_notification(&event).await;

        // Full replacement of the remote metadata: the original map merged
        // with the markers, so every pre-existing key survives.
        let mut merged: HashMap<String, String> = snapshot.metadata.clone();
        merged.insert(
            metadata_keys::EMAILS_SENT.to_string(),
            "true".to_string(),
        );
        merged.insert(
            metadata_keys::RECEIPT_SENT.to_string(),
            receipt_sent.to_string(),
        );
        merged.insert(
            metadata_keys::NOTIFICATION_SENT.to_string(),
            notification_sent.to_string(),
        );

        // The emails are already out, so a write-back failure does not fail
        // the check. It does leave the gate unset, and the next poll will
        // send again: at-least-once under write-back failure.
        if let Err(e) = self
            .gateway
            .update_intent_metadata(&snapshot.id, merged)
            .await
        {
            tracing::error!(
                "Error updating payment intent metadata for {}: {}",
                snapshot.id,
                e
            );
        }
    }

    fn append_audit_row(&self, snapshot: &IntentSnapshot, status: IntentStatus) {
        let record = TransactionLogRecord::from_snapshot(snapshot, status);
        if let Err(e) = self.ledger.append(&record) {
            tracing::error!(
                "Failed to append audit row for {}: {}",
                snapshot.id,
                e
            );
        }
    }
}
