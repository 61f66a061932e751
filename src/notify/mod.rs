pub mod templates;

use std::sync::Arc;

use chrono::Local;

use crate::{
    config::OrganizationConfig,
    domain::{IntentSnapshot, PaymentType},
    mail::Mailer,
};

/// Everything the emails need about a settled transaction, lifted off the
/// intent metadata at settlement time.
#[derive(Debug, Clone)]
pub struct SettlementEvent {
    pub transaction_id: String,
    pub payer_name: String,
    pub payer_email: Option<String>,
    pub amount_cents: i64,
    pub payment_type: Option<PaymentType>,
    pub raffle_quantity: Option<u32>,
}

impl SettlementEvent {
    pub fn from_snapshot(snapshot: &IntentSnapshot) -> Self {
        Self {
            transaction_id: snapshot.id.clone(),
            payer_name: snapshot.payer_name().to_string(),
            payer_email: snapshot.payer_email().map(String::from),
            amount_cents: snapshot.amount_cents,
            payment_type: snapshot.payment_type(),
            raffle_quantity: snapshot.raffle_quantity(),
        }
    }

    /// Lowercase name used in subjects and greeting copy.
    pub fn payment_type_name(&self) -> &'static str {
        self.payment_type.map(|t| t.as_str()).unwrap_or("payment")
    }

    /// Title-cased label used in detail rows.
    pub fn payment_type_label(&self) -> &'static str {
        self.payment_type.map(|t| t.label()).unwrap_or("Payment")
    }
}

/// Sends the donor receipt and the internal notification for a settlement.
/// Each send degrades to a logged warning and a `false` return; a mail
/// failure never aborts reconciliation.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    organization: OrganizationConfig,
    notification_email: String,
}

impl NotificationDispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        organization: OrganizationConfig,
        notification_email: String,
    ) -> Self {
        Self {
            mailer,
            organization,
            notification_email,
        }
    }

    /// HTML receipt to the payer. Returns false without attempting a send
    /// when no payer email is on file.
    pub async fn send_receipt(&self, event: &SettlementEvent) -> bool {
        let Some(to) = event.payer_email.as_deref() else {
            return false;
        };

        let date_str = Local::now().format("%B %d, %Y at %I:%M %p").to_string();
        let subject = templates::receipt_subject(event, &self.organization);
        let body = templates::receipt_body(
            event,
            &self.organization,
            &self.notification_email,
            &date_str,
        );

        match self.mailer.send(to, &subject, &body, true).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to send receipt to {}: {}", to, e);
                false
            }
        }
    }

    /// Plain-text notification to the operational inbox, always attempted.
    pub async fn send_notification(&self, event: &SettlementEvent) -> bool {
        let date_str = Local::now().format("%B %d, %Y at %I:%M %p").to_string();
        let subject = templates::notification_subject(event);
        let body = templates::notification_body(event, &self.organization, &date_str);

        match self
            .mailer
            .send(&self.notification_email, &subject, &body, false)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to send notification to {}: {}",
                    self.notification_email,
                    e
                );
                false
            }
        }
    }
}
