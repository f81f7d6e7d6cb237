//! Agreement terms and term-anchored payment models
//!
//! A term is one chronological phase of an agreement (option, construction,
//! operations, extensions). Its dates are not stored on the document; they
//! are derived by `schedule::terms::resolve_terms`.

use serde::{Deserialize, Serialize};

use crate::core::frequency::{FirstPaymentStart, Frequency};

pub const CONSTRUCTION: &str = "Construction";
pub const OPERATIONS: &str = "Operations";

/// One declared phase of an agreement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementTerm {
    /// Sequence position, unique within an agreement
    pub term_ordinal: u32,

    /// Free-form phase name, e.g. "Option", "Construction", "Operations"
    pub term_type: String,

    pub extension: bool,

    pub term_length_years: Option<f64>,

    /// Name of the `TermPaymentModel` paying this term
    pub payment_model: Option<String>,

    pub first_payment_start: FirstPaymentStart,

    /// Escalation applied when this term begins (e.g. 0.10 for +10%)
    pub escalation_rate: Option<f64>,

    /// Flat increase applied when this term begins
    pub increase_amount: Option<f64>,
}

impl AgreementTerm {
    pub fn new(term_ordinal: u32, term_type: impl Into<String>) -> Self {
        Self {
            term_ordinal,
            term_type: term_type.into(),
            ..Default::default()
        }
    }

    pub fn with_length_years(mut self, years: f64) -> Self {
        self.term_length_years = Some(years);
        self
    }

    pub fn with_payment_model(mut self, model: impl Into<String>) -> Self {
        self.payment_model = Some(model.into());
        self
    }

    pub fn as_extension(mut self) -> Self {
        self.extension = true;
        self
    }

    pub fn is_construction(&self) -> bool {
        self.term_type.trim().eq_ignore_ascii_case(CONSTRUCTION)
    }

    pub fn is_operations(&self) -> bool {
        self.term_type.trim().eq_ignore_ascii_case(OPERATIONS)
    }

    /// Construction and operations terms follow operational milestones.
    pub fn is_operational(&self) -> bool {
        self.is_construction() || self.is_operations()
    }

    /// Key grouping terms paid by the same model: the named payment model,
    /// falling back to the term type.
    pub fn model_key(&self) -> &str {
        match self.payment_model.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.term_type.trim(),
        }
    }
}

/// How a term is paid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermPaymentModel {
    /// Matches `AgreementTerm::payment_model` or `term_type`
    pub model_type: String,

    /// `None` is read as annual payment
    pub payment_frequency: Option<Frequency>,

    // Rate fields; the base payment is the largest applicable one
    pub minimum_payment: Option<f64>,
    pub payment_per_mw: Option<f64>,
    pub megawatts: Option<f64>,
    pub payment_per_mva: Option<f64>,
    pub inverter_count: Option<f64>,
    pub inverter_rating_mva: Option<f64>,
    pub flat_payment_amount: Option<f64>,
    pub payment_per_acre: Option<f64>,

    /// Acreage override; defaults to the agreement's controlled acres
    pub acres: Option<f64>,

    pub periodic_escalation_rate: Option<f64>,
    pub periodic_escalation_frequency: Option<Frequency>,

    /// Linear increase per elapsed escalation period
    pub increase_amount: Option<f64>,

    pub prorated_first_period: bool,
    pub first_payment_lag: Option<f64>,
    pub subsequent_payment_lag: Option<f64>,
    pub apply_payment_lag_to_extension: bool,

    /// Sends every payment to this payee instead of splitting across grantors
    pub payee: Option<String>,

    pub applicable_to_purchase: bool,
    pub refundable: bool,
}

impl TermPaymentModel {
    pub fn new(model_type: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            model_type: model_type.into(),
            payment_frequency: Some(frequency),
            ..Default::default()
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.payment_frequency
            .clone()
            .unwrap_or(Frequency::Annually)
    }

    /// Non-empty payee override, if any.
    pub fn payee_override(&self) -> Option<&str> {
        self.payee
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        !key.is_empty() && self.model_type.trim().eq_ignore_ascii_case(key)
    }
}

/// Find the model paying `term`.
///
/// Matches the term's payment model name, then its term type. A lone model
/// is used when either the model or the term is unnamed.
pub fn find_payment_model<'a>(
    models: &'a [TermPaymentModel],
    term: &AgreementTerm,
) -> Option<&'a TermPaymentModel> {
    if let Some(name) = term.payment_model.as_deref() {
        if let Some(model) = models.iter().find(|m| m.matches(name)) {
            return Some(model);
        }
    }
    if let Some(model) = models.iter().find(|m| m.matches(&term.term_type)) {
        return Some(model);
    }
    match models {
        [only] => {
            let term_unnamed = term
                .payment_model
                .as_deref()
                .map_or(true, |n| n.trim().is_empty());
            if only.model_type.trim().is_empty() || term_unnamed {
                Some(only)
            } else {
                None
            }
        }
        _ => None,
    }
}
