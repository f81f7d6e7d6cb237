//! Payment events
//!
//! The engine's output record: one payment to one payee on one date.
//! Events are immutable once produced.
//!
//! CRITICAL: `event_id` is derived from the event's identity (agreement,
//! source, model, index, payee), never from randomness, so recomputing an
//! unchanged snapshot yields identical ids.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a payment event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentSource {
    #[serde(rename = "Term Model")]
    TermModel,
    #[serde(rename = "Date Model")]
    DateModel,
    #[serde(rename = "Date Model (One Time)")]
    DateModelOneTime,
    #[serde(rename = "Purchase Price Calculation")]
    PurchasePriceCalculation,
}

impl PaymentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentSource::TermModel => "Term Model",
            PaymentSource::DateModel => "Date Model",
            PaymentSource::DateModelOneTime => "Date Model (One Time)",
            PaymentSource::PurchasePriceCalculation => "Purchase Price Calculation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub event_id: Uuid,
    pub payment_source: PaymentSource,
    pub model_id: String,

    /// 0-based position of the payment instant within its model
    pub payment_index: usize,

    pub payment_date: NaiveDate,

    /// Payment date shifted by the applicable lag, when one applies
    pub late_payment_date: Option<NaiveDate>,

    pub payment_type: String,
    pub payment_amount: f64,
    pub payee: String,

    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,

    pub prorata_factor: f64,
    pub applicable_to_purchase: bool,
    pub refundable: bool,
    pub after_outside_date: bool,
}

impl PaymentEvent {
    /// The date cash actually moves: the lagged date when present.
    pub fn due_date(&self) -> NaiveDate {
        self.late_payment_date.unwrap_or(self.payment_date)
    }
}

/// A payment instant before it is split across payees.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub source: PaymentSource,
    pub model_id: String,
    pub payment_index: usize,
    pub payment_date: NaiveDate,
    pub late_payment_date: Option<NaiveDate>,
    pub payment_type: String,

    /// Total across all payees
    pub total_amount: f64,

    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub prorata_factor: f64,
    pub applicable_to_purchase: bool,
    pub refundable: bool,
}

impl PaymentDraft {
    /// Materialize the share of this draft owed to `payee`.
    pub fn to_event(
        &self,
        agreement_id: &str,
        payee: &str,
        amount: f64,
        outside_date: Option<NaiveDate>,
    ) -> PaymentEvent {
        PaymentEvent {
            event_id: event_id(
                agreement_id,
                self.source,
                &self.model_id,
                self.payment_index,
                payee,
            ),
            payment_source: self.source,
            model_id: self.model_id.clone(),
            payment_index: self.payment_index,
            payment_date: self.payment_date,
            late_payment_date: self.late_payment_date,
            payment_type: self.payment_type.clone(),
            payment_amount: amount,
            payee: payee.to_string(),
            period_start: self.period_start,
            period_end: self.period_end,
            prorata_factor: self.prorata_factor,
            applicable_to_purchase: self.applicable_to_purchase,
            refundable: self.refundable,
            after_outside_date: outside_date.is_some_and(|outside| self.payment_date > outside),
        }
    }
}

/// Deterministic UUID v5 for a payment event.
pub fn event_id(
    agreement_id: &str,
    source: PaymentSource,
    model_id: &str,
    payment_index: usize,
    payee: &str,
) -> Uuid {
    let name = format!(
        "{}|{}|{}|{}|{}",
        agreement_id,
        source.as_str(),
        model_id,
        payment_index,
        payee
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Stable sort by payment date; ties keep generation order.
pub fn sort_by_payment_date(events: &mut [PaymentEvent]) {
    events.sort_by_key(|e| e.payment_date);
}
