//! Schedule Engine
//!
//! Runs the full computation for a batch of agreement documents:
//!
//! ```text
//! For each original document (amendments with an original in the batch
//! are paid through it and get an empty schedule):
//! 1. Fold its amendment chain into an effective view (originals only)
//! 2. Resolve term start/end dates and cumulative escalation
//! 3. Generate term payments (standard or blended)
//! 4. Generate date-model payments
//! 5. Net the purchase price against applicable prior payments
//! ```
//!
//! Each phase consumes the previous phase's output, so one agreement is
//! always computed end-to-end in this order. Agreements are independent of
//! each other apart from the shared, read-only group index.
//!
//! # Example
//!
//! ```rust
//! use agreement_schedule_core_rs::core::Frequency;
//! use agreement_schedule_core_rs::models::{Agreement, AgreementTerm, Grantor, TermPaymentModel};
//! use agreement_schedule_core_rs::orchestrator::{EngineConfig, ScheduleEngine};
//! use chrono::NaiveDate;
//!
//! let mut lease = Agreement::new("LEASE-1", "G-1");
//! lease.effective_date = NaiveDate::from_ymd_opt(2024, 1, 1);
//! lease.grantor = vec![Grantor::new("Smith")];
//! lease.agreement_terms = vec![AgreementTerm::new(1, "Option").with_length_years(1.0)];
//! let mut model = TermPaymentModel::new("Option", Frequency::Monthly);
//! model.flat_payment_amount = Some(1200.0);
//! lease.term_payment_models = vec![model];
//!
//! let engine = ScheduleEngine::new(EngineConfig::default()).unwrap();
//! let schedules = engine.compute_batch(&[lease]);
//! assert_eq!(schedules[0].terms[0].periodic_payments.len(), 12);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::calendar::{Calendar, GregorianCalendar};
use crate::core::frequency::Frequency;
use crate::models::agreement::Agreement;
use crate::models::payment::{sort_by_payment_date, PaymentEvent};
use crate::overlay::{apply_overlay, AgreementIndex, AmendmentSummary, EffectiveAgreement};
use crate::schedule::terms::{resolve_terms, ResolvedTerm};
use crate::schedule::{generate_date_payments, schedule_terms, ScheduleContext};
use crate::settlement::settle_purchase_price;

// ============================================================================
// Configuration Types
// ============================================================================

/// Engine configuration
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decimal places kept on payment amounts
    pub amount_decimals: u32,

    /// Decimal places kept on prorata factors
    pub prorata_decimals: u32,

    /// Hard bound on the periods generated for any one term or date model
    pub max_periods_per_model: usize,

    /// Escalation cadence when a model gives a rate without a frequency
    pub default_escalation_frequency: Frequency,

    /// Clamp a negative purchase-price remainder to zero instead of
    /// emitting a refund-direction settlement
    pub settlement_floor_at_zero: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            amount_decimals: 2,
            prorata_decimals: 4,
            max_periods_per_model: 2400,
            default_escalation_frequency: Frequency::Annually,
            settlement_floor_at_zero: false,
        }
    }
}

impl EngineConfig {
    pub const MAX_DECIMALS: u32 = 8;

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.amount_decimals > Self::MAX_DECIMALS {
            return Err(ScheduleError::InvalidConfig(format!(
                "amount_decimals must be at most {}, got {}",
                Self::MAX_DECIMALS,
                self.amount_decimals
            )));
        }
        if self.prorata_decimals > Self::MAX_DECIMALS {
            return Err(ScheduleError::InvalidConfig(format!(
                "prorata_decimals must be at most {}, got {}",
                Self::MAX_DECIMALS,
                self.prorata_decimals
            )));
        }
        if self.max_periods_per_model == 0 {
            return Err(ScheduleError::InvalidConfig(
                "max_periods_per_model must be positive".to_string(),
            ));
        }
        if !self.default_escalation_frequency.is_recognized() {
            return Err(ScheduleError::InvalidConfig(format!(
                "unrecognized default_escalation_frequency '{}'",
                self.default_escalation_frequency
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ScheduleError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Batch-level failures
///
/// Problems inside a single agreement never surface here; they degrade that
/// agreement's output and are recorded as skip reasons.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Fingerprint mismatch: expected {expected}, computed {actual}")]
    FingerprintMismatch { expected: String, actual: String },
}

// ============================================================================
// Output
// ============================================================================

/// Computed schedule for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedSchedule {
    pub agreement_id: String,
    pub agreement_group: String,
    pub document_type: String,

    /// Effective view's terms with their payments
    pub terms: Vec<ResolvedTerm>,

    /// Date-model and purchase-settlement payments, sorted by date
    pub date_payments: Vec<PaymentEvent>,

    pub total_controlled_acres: f64,
    pub final_term_end_date: Option<NaiveDate>,
    pub deed_effective_date: Option<NaiveDate>,

    /// Amendments folded into the effective view, in fold order
    pub amendments: Vec<AmendmentSummary>,

    /// Set on an amending document whose facts are paid through this
    /// original's schedule; such a schedule carries no payments itself
    pub base_agreement_id: Option<String>,
}

impl ComputedSchedule {
    /// Payment-free schedule for an amendment folded into `base_id`.
    fn folded_into(document: &Agreement, base_id: &str) -> Self {
        Self {
            agreement_id: document.id.clone(),
            agreement_group: document.agreement_group.clone(),
            document_type: document.document_type.clone(),
            terms: Vec::new(),
            date_payments: Vec::new(),
            total_controlled_acres: document.total_controlled_acres(),
            final_term_end_date: None,
            deed_effective_date: document.deed_date,
            amendments: Vec::new(),
            base_agreement_id: Some(base_id.to_string()),
        }
    }

    /// Every payment on the agreement, ascending by date.
    pub fn all_payments(&self) -> Vec<&PaymentEvent> {
        let mut all: Vec<&PaymentEvent> = self
            .terms
            .iter()
            .flat_map(|t| t.periodic_payments.iter())
            .chain(self.date_payments.iter())
            .collect();
        all.sort_by_key(|e| e.payment_date);
        all
    }

    pub fn total_amount(&self) -> f64 {
        self.all_payments().iter().map(|e| e.payment_amount).sum()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Deterministic schedule engine.
///
/// Holds no state between computations; the same documents and config
/// always produce the same schedules.
#[derive(Debug, Clone)]
pub struct ScheduleEngine<C: Calendar = GregorianCalendar> {
    config: EngineConfig,
    calendar: C,
}

impl ScheduleEngine<GregorianCalendar> {
    pub fn new(config: EngineConfig) -> Result<Self, ScheduleError> {
        Self::with_calendar(config, GregorianCalendar)
    }
}

impl<C: Calendar> ScheduleEngine<C> {
    pub fn with_calendar(config: EngineConfig, calendar: C) -> Result<Self, ScheduleError> {
        config.validate()?;
        Ok(Self { config, calendar })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Compute schedules for every document in the batch, in batch order.
    pub fn compute_batch(&self, documents: &[Agreement]) -> Vec<ComputedSchedule> {
        let index = AgreementIndex::build(documents);
        info!(
            documents = documents.len(),
            groups = index.num_groups(),
            "computing agreement schedules"
        );
        documents
            .iter()
            .map(|doc| self.compute_agreement(doc, &index))
            .collect()
    }

    /// Parse a JSON array of documents and compute their schedules.
    pub fn compute_batch_json(&self, json: &str) -> Result<Vec<ComputedSchedule>, ScheduleError> {
        let documents: Vec<Agreement> = serde_json::from_str(json)?;
        Ok(self.compute_batch(&documents))
    }

    /// Overlay the document's amendments, then compute its schedule.
    ///
    /// An amending document with an original in its group is paid only
    /// through that original's effective view and gets an empty schedule.
    pub fn compute_agreement(&self, document: &Agreement, index: &AgreementIndex<'_>) -> ComputedSchedule {
        if let Some(base) = folding_base(document, index) {
            debug!(
                agreement_id = %document.id,
                base_agreement_id = %base.id,
                "amendment paid through its original"
            );
            return ComputedSchedule::folded_into(document, &base.id);
        }
        let view = apply_overlay(document, index);
        self.compute_effective(&view)
    }

    /// Compute the schedule of an already-overlaid view.
    pub fn compute_effective(&self, view: &EffectiveAgreement) -> ComputedSchedule {
        let agreement = &view.agreement;
        let ctx = ScheduleContext::new(agreement, &self.config);

        let timeline = resolve_terms(&self.calendar, agreement);
        let timeline = schedule_terms(
            &self.calendar,
            &ctx,
            &agreement.term_payment_models,
            timeline,
        );

        let mut date_payments =
            generate_date_payments(&self.calendar, &ctx, &agreement.date_payment_models);
        let settlement = settle_purchase_price(
            &ctx,
            agreement,
            timeline
                .terms
                .iter()
                .flat_map(|t| t.periodic_payments.iter())
                .chain(date_payments.iter()),
        );
        date_payments.extend(settlement);
        sort_by_payment_date(&mut date_payments);

        debug!(
            agreement_id = %agreement.id,
            terms = timeline.terms.len(),
            date_payments = date_payments.len(),
            amendments = view.amendments.len(),
            "agreement scheduled"
        );

        ComputedSchedule {
            agreement_id: agreement.id.clone(),
            agreement_group: agreement.agreement_group.clone(),
            document_type: agreement.document_type.clone(),
            total_controlled_acres: agreement.total_controlled_acres(),
            final_term_end_date: timeline.final_term_end_date,
            deed_effective_date: view.deed_effective_date(),
            amendments: view.amendments.clone(),
            terms: timeline.terms,
            date_payments,
            base_agreement_id: None,
        }
    }
}

/// The original an amending document is folded into, if the batch has one.
fn folding_base<'a>(document: &Agreement, index: &AgreementIndex<'a>) -> Option<&'a Agreement> {
    if document.is_original() || !document.carries_amendment_date() {
        return None;
    }
    index
        .group(&document.agreement_group)
        .iter()
        .copied()
        .find(|doc| doc.is_original() && doc.id != document.id)
}
