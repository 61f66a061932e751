use serde::Serialize;

/// Stripe's card-present pricing: 2.9% + 30 cents.
const FEE_PERCENTAGE: f64 = 0.029;
const FEE_FIXED_CENTS: i64 = 30;

/// Processing fee for a base amount, in cents.
pub fn fee_amount(base_cents: i64) -> i64 {
    (base_cents as f64 * FEE_PERCENTAGE).round() as i64 + FEE_FIXED_CENTS
}

/// Total charge when the payer opts to cover the processing fee.
pub fn total_with_fees(base_cents: i64) -> i64 {
    base_cents + fee_amount(base_cents)
}

/// Fee breakdown for a prospective payment. Derived entirely from the base
/// amount; nothing here is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    pub base_amount_cents: i64,
    pub fee_amount_cents: i64,
    pub total_with_fees_cents: i64,
}

impl FeeQuote {
    pub fn for_amount(base_cents: i64) -> Self {
        Self {
            base_amount_cents: base_cents,
            fee_amount_cents: fee_amount(base_cents),
            total_with_fees_cents: total_with_fees(base_cents),
        }
    }
}

/// Two-decimal dollar rendering of an integer cent amount.
pub fn format_dollars(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}
