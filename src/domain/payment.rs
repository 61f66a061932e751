use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Metadata keys this system attaches to a payment intent. The metadata map
/// on the remote intent is the only state we persist per transaction.
pub mod metadata_keys {
    pub const PAYMENT_TYPE: &str = "payment_type";
    pub const PAYER_NAME: &str = "payer_name";
    pub const PAYER_EMAIL: &str = "payer_email";
    pub const BASE_AMOUNT: &str = "base_amount";
    pub const COVER_FEES: &str = "cover_fees";
    pub const FEE_AMOUNT: &str = "fee_amount";
    pub const RAFFLE_QUANTITY: &str = "raffle_quantity";

    // Idempotency markers written back on first observed settlement.
    pub const EMAILS_SENT: &str = "emails_sent";
    pub const RECEIPT_SENT: &str = "receipt_sent";
    pub const NOTIFICATION_SENT: &str = "notification_sent";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Membership,
    Donation,
    Raffle,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Membership => "membership",
            PaymentType::Donation => "donation",
            PaymentType::Raffle => "raffle",
        }
    }

    /// Title-cased label for email copy ("Membership", "Donation", "Raffle").
    pub fn label(&self) -> &'static str {
        match self {
            PaymentType::Membership => "Membership",
            PaymentType::Donation => "Donation",
            PaymentType::Raffle => "Raffle",
        }
    }
}

impl FromStr for PaymentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "membership" => Ok(PaymentType::Membership),
            "donation" => Ok(PaymentType::Donation),
            "raffle" => Ok(PaymentType::Raffle),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    Individual,
    Household,
}

impl MembershipTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipTier::Individual => "individual",
            MembershipTier::Household => "household",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MembershipTier::Individual => "Individual",
            MembershipTier::Household => "Household",
        }
    }
}

impl FromStr for MembershipTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(MembershipTier::Individual),
            "household" => Ok(MembershipTier::Household),
            _ => Err(()),
        }
    }
}

/// A validated request to charge the terminal.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub payment_type: PaymentType,
    pub membership_tier: Option<MembershipTier>,
    /// Caller-supplied amount for donations and raffles; ignored for
    /// memberships, which use the configured tier pricing.
    pub amount_cents: Option<i64>,
    pub payer_name: String,
    pub payer_email: Option<String>,
    pub cover_fees: bool,
    pub raffle_quantity: Option<u32>,
}

/// Terminal states we react to, as reported by the payment processor.
/// Everything non-terminal collapses to `Pending`; the raw processor status
/// string is relayed to callers unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentStatus {
    Pending,
    Succeeded,
    Canceled,
    PaymentFailed,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Pending => "pending",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Canceled => "canceled",
            IntentStatus::PaymentFailed => "payment_failed",
        }
    }
}

/// Point-in-time view of a remote payment intent. The intent itself is owned
/// by the processor; we only ever hold a snapshot.
#[derive(Debug, Clone)]
pub struct IntentSnapshot {
    pub id: String,
    pub status: IntentStatus,
    /// Processor-reported status string, relayed verbatim in API responses.
    pub raw_status: String,
    pub amount_cents: i64,
    pub metadata: HashMap<String, String>,
}

impl IntentSnapshot {
    /// Whether the at-most-once email marker has already been written back.
    pub fn emails_sent(&self) -> bool {
        self.metadata
            .get(metadata_keys::EMAILS_SENT)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn payer_name(&self) -> &str {
        self.metadata
            .get(metadata_keys::PAYER_NAME)
            .map(String::as_str)
            .unwrap_or("Unknown")
    }

    pub fn payer_email(&self) -> Option<&str> {
        self.metadata
            .get(metadata_keys::PAYER_EMAIL)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn payment_type(&self) -> Option<PaymentType> {
        self.metadata
            .get(metadata_keys::PAYMENT_TYPE)
            .and_then(|v| v.parse().ok())
    }

    pub fn raffle_quantity(&self) -> Option<u32> {
        self.metadata
            .get(metadata_keys::RAFFLE_QUANTITY)
            .and_then(|v| v.parse().ok())
    }
}
