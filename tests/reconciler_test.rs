mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{snapshot, FakeGateway, FakeMailer, MemoryLedger};
use tallybox::{
    config::OrganizationConfig,
    domain::IntentStatus,
    notify::NotificationDispatcher,
    reconcile::SettlementReconciler,
};

const NOTIFY_ADDR: &str = "board@example.org";

fn reconciler(
    gateway: Arc<FakeGateway>,
    mailer: Arc<FakeMailer>,
    ledger: Arc<MemoryLedger>,
) -> SettlementReconciler {
    let dispatcher = NotificationDispatcher::new(
        mailer,
        OrganizationConfig::default(),
        NOTIFY_ADDR.to_string(),
    );
    SettlementReconciler::new(gateway, dispatcher, ledger)
}

#[tokio::test]
async fn first_observed_success_sends_both_emails_and_flags_the_intent() {
    let gateway = Arc::new(FakeGateway::with_intent(snapshot(
        "pi_1",
        IntentStatus::Succeeded,
        1000,
        &[
            ("payment_type", "donation"),
            ("payer_name", "Ada Lovelace"),
            ("payer_email", "a@b.com"),
            ("base_amount", "1000"),
            ("cover_fees", "false"),
        ],
    )));
    let mailer = Arc::new(FakeMailer::default());
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    let result = reconciler.check("pi_1").await.unwrap();

    assert_eq!(result.raw_status, "succeeded");
    assert_eq!(result.amount_cents, 1000);
    // The response relays the metadata as retrieved; the markers land on the
    // remote object only.
    assert!(!result.metadata.contains_key("emails_sent"));

    // Exactly one receipt and one internal notification.
    assert_eq!(mailer.send_count(), 2);
    let receipts = mailer.sent_to("a@b.com");
    assert_eq!(receipts.len(), 1);
    assert!(receipts[0].html);
    assert!(receipts[0].subject.starts_with("Receipt for your donation"));
    let notifications = mailer.sent_to(NOTIFY_ADDR);
    assert_eq!(notifications.len(), 1);
    assert!(!notifications[0].html);

    // Write-back merged the original metadata with the markers.
    let stored = gateway.stored_metadata("pi_1");
    assert_eq!(stored["emails_sent"], "true");
    assert_eq!(stored["receipt_sent"], "true");
    assert_eq!(stored["notification_sent"], "true");
    assert_eq!(stored["payer_name"], "Ada Lovelace");
    assert_eq!(stored["base_amount"], "1000");

    assert_eq!(ledger.statuses(), vec!["succeeded"]);
}

#[tokio::test]
async fn second_check_on_flagged_intent_is_an_idempotent_noop() {
    let gateway = Arc::new(FakeGateway::with_intent(snapshot(
        "pi_2",
        IntentStatus::Succeeded,
        1000,
        &[
            ("payment_type", "donation"),
            ("payer_name", "Ada Lovelace"),
            ("payer_email", "a@b.com"),
        ],
    )));
    let mailer = Arc::new(FakeMailer::default());
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    let first = reconciler.check("pi_2").await.unwrap();
    let second = reconciler.check("pi_2").await.unwrap();

    // No additional mail sends, audit rows, or metadata writes.
    assert_eq!(mailer.send_count(), 2);
    assert_eq!(ledger.row_count(), 1);
    assert_eq!(gateway.update_calls.load(Ordering::SeqCst), 1);

    assert_eq!(first.raw_status, second.raw_status);
    assert_eq!(first.amount_cents, second.amount_cents);
    // The second poll sees the flags the first one wrote back.
    assert_eq!(second.metadata["emails_sent"], "true");
}

#[tokio::test]
async fn success_without_payer_email_skips_the_receipt() {
    let gateway = Arc::new(FakeGateway::with_intent(snapshot(
        "pi_3",
        IntentStatus::Succeeded,
        3500,
        &[
            ("payment_type", "membership"),
            ("payer_name", "Ada Lovelace"),
        ],
    )));
    let mailer = Arc::new(FakeMailer::default());
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    reconciler.check("pi_3").await.unwrap();

    assert_eq!(mailer.send_count(), 1);
    assert_eq!(mailer.sent_to(NOTIFY_ADDR).len(), 1);

    let stored = gateway.stored_metadata("pi_3");
    assert_eq!(stored["emails_sent"], "true");
    assert_eq!(stored["receipt_sent"], "false");
    assert_eq!(stored["notification_sent"], "true");
}

#[tokio::test]
async fn canceled_intent_is_logged_on_every_observation() {
    let gateway = Arc::new(FakeGateway::with_intent(snapshot(
        "pi_4",
        IntentStatus::Canceled,
        500,
        &[("payment_type", "raffle"), ("payer_name", "Ada Lovelace")],
    )));
    let mailer = Arc::new(FakeMailer::default());
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    reconciler.check("pi_4").await.unwrap();
    reconciler.check("pi_4").await.unwrap();

    // Duplicate rows are intentional for terminal failure states.
    assert_eq!(ledger.statuses(), vec!["canceled", "canceled"]);
    assert_eq!(mailer.send_count(), 0);
    assert_eq!(gateway.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_intent_is_logged_without_email_dispatch() {
    let gateway = Arc::new(FakeGateway::with_intent(snapshot(
        "pi_5",
        IntentStatus::PaymentFailed,
        1000,
        &[("payment_type", "donation"), ("payer_email", "a@b.com")],
    )));
    let mailer = Arc::new(FakeMailer::default());
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    reconciler.check("pi_5").await.unwrap();

    assert_eq!(ledger.statuses(), vec!["payment_failed"]);
    assert_eq!(mailer.send_count(), 0);
}

#[tokio::test]
async fn pending_intent_has_no_side_effects() {
    let mut pending = snapshot("pi_6", IntentStatus::Pending, 1000, &[]);
    pending.raw_status = "processing".to_string();
    let gateway = Arc::new(FakeGateway::with_intent(pending));
    let mailer = Arc::new(FakeMailer::default());
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    let result = reconciler.check("pi_6").await.unwrap();

    assert_eq!(result.raw_status, "processing");
    assert_eq!(mailer.send_count(), 0);
    assert_eq!(ledger.row_count(), 0);
    assert_eq!(gateway.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn write_back_failure_is_swallowed_and_leads_to_resend() {
    let gateway = Arc::new(FakeGateway::with_intent(snapshot(
        "pi_7",
        IntentStatus::Succeeded,
        1000,
        &[("payment_type", "donation"), ("payer_email", "a@b.com")],
    )));
    gateway.fail_updates.store(true, Ordering::SeqCst);
    let mailer = Arc::new(FakeMailer::default());
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    // The emails went out, so the check itself still reports success.
    let result = reconciler.check("pi_7").await.unwrap();
    assert_eq!(result.raw_status, "succeeded");
    assert_eq!(mailer.send_count(), 2);

    // The gate never landed, so the next poll sends again: at-least-once
    // under write-back failure.
    reconciler.check("pi_7").await.unwrap();
    assert_eq!(mailer.send_count(), 4);
}

#[tokio::test]
async fn mail_failure_is_recorded_in_the_markers() {
    let gateway = Arc::new(FakeGateway::with_intent(snapshot(
        "pi_8",
        IntentStatus::Succeeded,
        1000,
        &[("payment_type", "donation"), ("payer_email", "a@b.com")],
    )));
    let mailer = Arc::new(FakeMailer::default());
    mailer.fail_sends.store(true, Ordering::SeqCst);
    let ledger = Arc::new(MemoryLedger::default());
    let reconciler = reconciler(gateway.clone(), mailer.clone(), ledger.clone());

    reconciler.check("pi_8").await.unwrap();

    // Send failures degrade to false flags; the idempotency gate still closes.
    let stored = gateway.stored_metadata("pi_8");
    assert_eq!(stored["emails_sent"], "true");
    assert_eq!(stored["receipt_sent"], "false");
    assert_eq!(stored["notification_sent"], "false");
}
