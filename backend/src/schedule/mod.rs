//! Schedule generation
//!
//! Turns a resolved agreement view into payment events:
//!
//! - **period**: period boundaries and prorata fractions
//! - **terms**: term start/end resolution and cumulative escalation
//! - **standard**: period-stepping generator for term models
//! - **blended**: prorated generator that splits periods at escalation
//!   boundaries
//! - **date_based**: generator for calendar-anchored models
//! - **payee**: fan-out of each payment instant across payees
//!
//! # Error handling
//!
//! Nothing in this module fails an agreement. A term or model that cannot be
//! scheduled yields no events and records a `SkipReason`.

pub mod blended;
pub mod date_based;
pub mod payee;
pub mod period;
pub mod standard;
pub mod terms;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::calendar::Calendar;
use crate::core::frequency::FirstPaymentStart;
use crate::core::growth::num;
use crate::models::agreement::Agreement;
use crate::models::payment::{sort_by_payment_date, PaymentDraft, PaymentEvent};
use crate::models::term::{find_payment_model, TermPaymentModel};
use crate::orchestrator::EngineConfig;
use payee::{allocate, payee_shares, PayeeShare};
use terms::{ResolvedTerm, TermTimeline};

pub use date_based::generate_date_payments;
pub use terms::resolve_terms;

/// Why a term or model produced no payment events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingPaymentModel,
    MissingStartDate,
    MissingEndDate,
    CancelledByOperations,
    CancelledByTermination,
    NoPayees,
    UnrecognizedFrequency,
}

/// Agreement-level facts every generator needs, computed once per agreement.
#[derive(Debug, Clone)]
pub struct ScheduleContext<'a> {
    pub agreement_id: &'a str,
    pub payees: Vec<PayeeShare>,
    pub controlled_acres: f64,
    pub closing_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub outside_date: Option<NaiveDate>,
    pub config: &'a EngineConfig,
}

impl<'a> ScheduleContext<'a> {
    pub fn new(agreement: &'a Agreement, config: &'a EngineConfig) -> Self {
        Self {
            agreement_id: &agreement.id,
            payees: payee_shares(&agreement.grantor),
            controlled_acres: agreement.total_controlled_acres(),
            closing_date: agreement.closing_date(),
            termination_date: agreement.termination_date(),
            outside_date: agreement.outside_date,
            config,
        }
    }

    pub fn has_payees(&self) -> bool {
        !self.payees.is_empty()
    }

    /// True while `date` is not past the purchase closing.
    pub fn before_closing(&self, date: NaiveDate) -> bool {
        self.closing_date.map_or(true, |closing| date <= closing)
    }

    /// Fan a payment instant out to its payees.
    ///
    /// A payee override sends the whole amount to that payee.
    pub fn emit(&self, draft: &PaymentDraft, payee_override: Option<&str>) -> Vec<PaymentEvent> {
        let decimals = self.config.amount_decimals;
        let shares = match payee_override {
            Some(payee) => vec![PayeeShare {
                payee: payee.to_string(),
                share: 1.0,
            }],
            None => self.payees.clone(),
        };
        allocate(draft.total_amount, &shares, decimals)
            .into_iter()
            .map(|(payee, amount)| draft.to_event(self.agreement_id, &payee, amount, self.outside_date))
            .collect()
    }
}

/// Payment date for a lag of `lag_days`, if one applies.
pub(crate) fn lagged_date<C: Calendar>(cal: &C, date: NaiveDate, lag_days: Option<f64>) -> Option<NaiveDate> {
    let lag = num(lag_days).round() as i64;
    (lag > 0).then(|| cal.add_days(date, lag))
}

/// First payment date of a term under its first-payment policy.
pub fn first_payment_date<C: Calendar>(cal: &C, start: NaiveDate, policy: &FirstPaymentStart) -> NaiveDate {
    use chrono::Datelike;

    match policy {
        FirstPaymentStart::AtTermStart => start,
        FirstPaymentStart::FollowingJanuary => {
            if start.month() == 1 && start.day() == 1 {
                start
            } else {
                NaiveDate::from_ymd_opt(start.year() + 1, 1, 1).unwrap_or(start)
            }
        }
        FirstPaymentStart::FollowingMonth => {
            if start.day() == 1 {
                start
            } else {
                cal.add_days(cal.end_of_month(start), 1)
            }
        }
        FirstPaymentStart::Unrecognized(raw) => {
            warn!(policy = %raw, "unrecognized first payment policy; paying at term start");
            start
        }
    }
}

/// Generate payments for every term on the timeline.
///
/// Picks the blended generator when the term's model prorates its first
/// period and escalates periodically, the standard generator otherwise.
pub fn schedule_terms<C: Calendar>(
    cal: &C,
    ctx: &ScheduleContext<'_>,
    models: &[TermPaymentModel],
    mut timeline: TermTimeline,
) -> TermTimeline {
    let anchors: Vec<Option<NaiveDate>> = timeline
        .terms
        .iter()
        .map(|t| timeline.model_anchor(t.term.model_key()))
        .collect();

    for (term, anchor) in timeline.terms.iter_mut().zip(anchors) {
        if term.skip_reason.is_some() {
            continue;
        }
        match schedule_term(cal, ctx, models, term, anchor) {
            Ok(mut events) => {
                sort_by_payment_date(&mut events);
                term.periodic_payments = events;
            }
            Err(reason) => {
                debug!(
                    agreement_id = %ctx.agreement_id,
                    term_ordinal = term.term.term_ordinal,
                    ?reason,
                    "term produced no payments"
                );
                term.skip_reason = Some(reason);
            }
        }
    }
    timeline
}

fn schedule_term<C: Calendar>(
    cal: &C,
    ctx: &ScheduleContext<'_>,
    models: &[TermPaymentModel],
    term: &ResolvedTerm,
    anchor: Option<NaiveDate>,
) -> Result<Vec<PaymentEvent>, SkipReason> {
    if term.cancelled_by_ops {
        return Err(SkipReason::CancelledByOperations);
    }
    if term.cancelled_by_termination {
        return Err(SkipReason::CancelledByTermination);
    }
    let model = find_payment_model(models, &term.term).ok_or(SkipReason::MissingPaymentModel)?;
    let start = term.start_date.ok_or(SkipReason::MissingStartDate)?;
    if term.end_date.is_none() {
        return Err(SkipReason::MissingEndDate);
    }
    if !ctx.has_payees() {
        return Err(SkipReason::NoPayees);
    }

    if model.prorated_first_period && num(model.periodic_escalation_rate) > 0.0 {
        blended::generate_blended(cal, ctx, term, model, anchor.unwrap_or(start))
    } else {
        standard::generate_standard(cal, ctx, term, model)
    }
}
