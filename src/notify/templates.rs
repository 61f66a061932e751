use crate::{config::OrganizationConfig, domain::fees::format_dollars};

use super::SettlementEvent;

pub fn receipt_subject(event: &SettlementEvent, org: &OrganizationConfig) -> String {
    format!("Receipt for your {} - {}", event.payment_type_name(), org.name)
}

pub fn receipt_body(
    event: &SettlementEvent,
    org: &OrganizationConfig,
    notification_email: &str,
    date_str: &str,
) -> String {
    let mut detail_rows = format!(
        r#"<p><strong>Name:</strong> {}</p>
            <p><strong>Amount:</strong> ${}</p>
            <p><strong>Type:</strong> {}</p>"#,
        event.payer_name,
        format_dollars(event.amount_cents),
        event.payment_type_label(),
    );

    // Raffle purchases additionally show the ticket count and effective
    // per-ticket price.
    if let Some(quantity) = event.raffle_quantity.filter(|q| *q > 0) {
        let per_ticket = event.amount_cents as f64 / quantity as f64 / 100.0;
        detail_rows.push_str(&format!(
            r#"
            <p><strong>Tickets:</strong> {}</p>
            <p><strong>Price per ticket:</strong> ${:.2}</p>"#,
            quantity, per_ticket,
        ));
    }

    format!(
        r#"
    <html>
    <body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
        <div style="text-align: center; margin-bottom: 30px;">
            <h1 style="color: #2c5aa0;">{org_name}</h1>
            <h2 style="color: #666;">Payment Receipt</h2>
        </div>

        <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 20px;">
            <h3 style="margin-top: 0; color: #28a745;">Thank you for your {payment_type}!</h3>
            {detail_rows}
            <p><strong>Date:</strong> {date}</p>
            <p><strong>Transaction ID:</strong> {transaction_id}</p>
        </div>

        <div style="border-top: 1px solid #ddd; padding-top: 20px; font-size: 14px; color: #666;">
            <p>This receipt serves as confirmation of your payment. Please keep this for your records.</p>
            <p>If you have any questions, please contact us at {contact}</p>
        </div>

        <div style="text-align: center; margin-top: 30px; font-size: 12px; color: #999;">
            <p>{org_name}<br>
            Thank you for supporting our community!</p>
        </div>
    </body>
    </html>
    "#,
        org_name = org.name,
        payment_type = event.payment_type_name(),
        detail_rows = detail_rows,
        date = date_str,
        transaction_id = event.transaction_id,
        contact = notification_email,
    )
}

pub fn notification_subject(event: &SettlementEvent) -> String {
    format!(
        "New {} received - ${}",
        event.payment_type_name(),
        format_dollars(event.amount_cents)
    )
}

pub fn notification_body(
    event: &SettlementEvent,
    org: &OrganizationConfig,
    date_str: &str,
) -> String {
    format!(
        r#"
New payment received through the POS system:

PAYMENT DETAILS:
- Type: {payment_type}
- Amount: ${amount}
- Donor: {payer_name}
- Email: {payer_email}
- Date: {date}
- Transaction ID: {transaction_id}

This payment was processed through Stripe Terminal at your community event.

---
{org_name} POS System
    "#,
        payment_type = event.payment_type_label(),
        amount = format_dollars(event.amount_cents),
        payer_name = event.payer_name,
        payer_email = event.payer_email.as_deref().unwrap_or("Not provided"),
        date = date_str,
        transaction_id = event.transaction_id,
        org_name = org.name,
    )
}
