//! Purchase-Price Settlement
//!
//! When an option is exercised, the closing payment is the full purchase
//! price net of every prior payment that the agreement credits toward the
//! purchase.
//!
//! # Trigger
//!
//! - A full purchase price is set
//! - A purchase date or estimated closing date is known
//! - The agreement has not been terminated
//!
//! # Critical Invariant
//!
//! Per-payee settlement amounts sum to `price - sum(applicable prior payments)`.
//! The remainder may be negative when credits exceed the price; it is only
//! clamped to zero when `EngineConfig::settlement_floor_at_zero` is set.

use tracing::{debug, warn};

use crate::core::growth::sanitize;
use crate::models::agreement::Agreement;
use crate::models::payment::{PaymentDraft, PaymentEvent, PaymentSource};
use crate::schedule::ScheduleContext;

pub const SETTLEMENT_MODEL_ID: &str = "purchase-price";
pub const SETTLEMENT_PAYMENT_TYPE: &str = "Purchase Price";

/// Sum of prior payments credited toward the purchase price.
pub fn applicable_total<'e>(prior: impl IntoIterator<Item = &'e PaymentEvent>) -> f64 {
    prior
        .into_iter()
        .filter(|e| e.applicable_to_purchase)
        .map(|e| sanitize(e.payment_amount))
        .sum()
}

/// Emit the closing settlement, one event per payee.
///
/// Returns no events when the trigger conditions are not met.
pub fn settle_purchase_price<'e>(
    ctx: &ScheduleContext<'_>,
    agreement: &Agreement,
    prior: impl IntoIterator<Item = &'e PaymentEvent>,
) -> Vec<PaymentEvent> {
    let Some(price) = agreement
        .full_purchase_price
        .filter(|p| p.is_finite() && *p != 0.0)
    else {
        return Vec::new();
    };
    let Some(closing) = agreement.closing_date() else {
        return Vec::new();
    };
    if agreement.termination_date().is_some() {
        debug!(agreement_id = %agreement.id, "terminated; no purchase settlement");
        return Vec::new();
    }
    if !ctx.has_payees() {
        debug!(agreement_id = %agreement.id, "no payees; no purchase settlement");
        return Vec::new();
    }

    let credited = applicable_total(prior);
    let mut remainder = price - credited;
    if remainder < 0.0 && ctx.config.settlement_floor_at_zero {
        warn!(
            agreement_id = %agreement.id,
            price,
            credited,
            "credited payments exceed purchase price; settlement floored at zero"
        );
        remainder = 0.0;
    } else if remainder < 0.0 {
        debug!(
            agreement_id = %agreement.id,
            price,
            credited,
            "credited payments exceed purchase price; negative settlement"
        );
    }

    let draft = PaymentDraft {
        source: PaymentSource::PurchasePriceCalculation,
        model_id: SETTLEMENT_MODEL_ID.to_string(),
        payment_index: 0,
        payment_date: closing,
        late_payment_date: None,
        payment_type: SETTLEMENT_PAYMENT_TYPE.to_string(),
        total_amount: remainder,
        period_start: None,
        period_end: None,
        prorata_factor: 1.0,
        applicable_to_purchase: true,
        refundable: false,
    };
    ctx.emit(&draft, None)
}
