use std::collections::HashMap;

use crate::{
    config::PaymentConfig,
    domain::{
        fees::{fee_amount, format_dollars, total_with_fees},
        metadata_keys, MembershipTier, PaymentRequest, PaymentType,
    },
    error::{AppError, Result},
};

use super::CreateIntentParams;

/// Resolve a payment request into the processor-facing creation call:
/// final amount (fee-inclusive when the payer covers fees), human-readable
/// description, and the metadata map carried on the intent for its lifetime.
pub fn build_intent_params(
    request: &PaymentRequest,
    pricing: &PaymentConfig,
) -> Result<CreateIntentParams> {
    let base_amount = resolve_base_amount(request, pricing)?;
    let mut description = describe(request);

    let final_amount = if request.cover_fees {
        let fee = fee_amount(base_amount);
        description.push_str(&format!(
            " (includes ${} processing fee)",
            format_dollars(fee)
        ));
        total_with_fees(base_amount)
    } else {
        base_amount
    };

    let mut metadata = HashMap::new();
    metadata.insert(
        metadata_keys::PAYMENT_TYPE.to_string(),
        request.payment_type.as_str().to_string(),
    );
    metadata.insert(
        metadata_keys::PAYER_NAME.to_string(),
        request.payer_name.clone(),
    );
    metadata.insert(
        metadata_keys::BASE_AMOUNT.to_string(),
        base_amount.to_string(),
    );
    metadata.insert(
        metadata_keys::COVER_FEES.to_string(),
        request.cover_fees.to_string(),
    );

    if request.cover_fees {
        metadata.insert(
            metadata_keys::FEE_AMOUNT.to_string(),
            fee_amount(base_amount).to_string(),
        );
    }

    if let Some(email) = request.payer_email.as_deref().filter(|e| !e.is_empty()) {
        metadata.insert(metadata_keys::PAYER_EMAIL.to_string(), email.to_string());
    }

    if request.payment_type == PaymentType::Raffle {
        if let Some(quantity) = request.raffle_quantity {
            metadata.insert(
                metadata_keys::RAFFLE_QUANTITY.to_string(),
                quantity.to_string(),
            );
        }
    }

    Ok(CreateIntentParams {
        amount_cents: final_amount,
        description,
        metadata,
    })
}

/// Membership amounts come from configuration; donation and raffle amounts
/// from the caller, validated positive.
pub fn resolve_base_amount(request: &PaymentRequest, pricing: &PaymentConfig) -> Result<i64> {
    match request.payment_type {
        PaymentType::Membership => match request.membership_tier {
            Some(MembershipTier::Individual) => Ok(pricing.individual_membership_cents),
            Some(MembershipTier::Household) => Ok(pricing.household_membership_cents),
            None => Err(AppError::Validation(
                "Invalid membership type".to_string(),
            )),
        },
        PaymentType::Donation | PaymentType::Raffle => match request.amount_cents {
            Some(amount) if amount > 0 => Ok(amount),
            _ => Err(AppError::Validation("Invalid amount".to_string())),
        },
    }
}

fn describe(request: &PaymentRequest) -> String {
    match request.payment_type {
        PaymentType::Membership => {
            let tier = request
                .membership_tier
                .map(|t| t.label())
                .unwrap_or("Membership");
            format!("{} membership payment from {}", tier, request.payer_name)
        }
        PaymentType::Donation => format!("Donation from {}", request.payer_name),
        PaymentType::Raffle => match request.raffle_quantity {
            Some(quantity) => format!(
                "Raffle ticket purchase from {} ({} tickets)",
                request.payer_name, quantity
            ),
            None => format!("Raffle ticket purchase from {}", request.payer_name),
        },
    }
}
