//! Term Date Resolver
//!
//! Resolves the chronological structure of an agreement's terms from their
//! declared ordinals and lengths, the operational milestones and any
//! termination.
//!
//! # Start date precedence
//!
//! 1. A non-extension Construction/Operations term adopts the matching
//!    commencement milestone when one is recorded
//! 2. Otherwise the day after the previous term's end, or the agreement's
//!    commencement/effective date for the first term
//!
//! # End date
//!
//! `start + term_length_years - 1 day`, never before `start`. Then:
//!
//! - Pre-operational terms (ordinal before the first Construction/Operations
//!   term) are truncated to end the day before the earliest operational
//!   milestone, or cancelled when the milestone is at or before their start
//! - A Construction term is truncated (or cancelled) at Operations
//!   commencement
//!
//! Whatever end survives is finally capped at the termination date.
//!
//! # Critical Invariants
//!
//! 1. Terms are ordered by `term_ordinal`
//! 2. `end_date >= start_date` whenever both exist
//! 3. No `end_date` is later than the termination date
//! 4. Cumulative escalation/increase folds only same-model terms with
//!    ordinal <= the term's own

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SkipReason;
use crate::core::calendar::Calendar;
use crate::core::growth::{num, sanitize};
use crate::models::agreement::Agreement;
use crate::models::payment::PaymentEvent;
use crate::models::term::AgreementTerm;

/// An agreement term with its derived dates and payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTerm {
    #[serde(flatten)]
    pub term: AgreementTerm,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Superseded by an operational milestone
    pub cancelled_by_ops: bool,

    /// Begins after the agreement was terminated
    pub cancelled_by_termination: bool,

    pub cumulative_increase_amount: f64,

    /// Product of `(1 + escalation_rate)` over the term's cohort
    pub cumulative_escalation_rate: f64,

    pub periodic_payments: Vec<PaymentEvent>,

    /// Why the term produced no payments, when it produced none
    pub skip_reason: Option<SkipReason>,
}

impl ResolvedTerm {
    fn unresolved(term: AgreementTerm) -> Self {
        Self {
            term,
            start_date: None,
            end_date: None,
            cancelled_by_ops: false,
            cancelled_by_termination: false,
            cumulative_increase_amount: 0.0,
            cumulative_escalation_rate: 1.0,
            periodic_payments: Vec::new(),
            skip_reason: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled_by_ops || self.cancelled_by_termination
    }
}

/// All terms of one agreement, resolved and ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermTimeline {
    pub terms: Vec<ResolvedTerm>,

    /// End date of the last term, for reporting
    pub final_term_end_date: Option<NaiveDate>,
}

impl TermTimeline {
    /// Start of the earliest-ordinal term in the `model_key` cohort that has
    /// a start date. Anchors escalation that spans terms.
    pub fn model_anchor(&self, model_key: &str) -> Option<NaiveDate> {
        self.terms
            .iter()
            .filter(|t| t.term.model_key().eq_ignore_ascii_case(model_key))
            .find_map(|t| t.start_date)
    }
}

/// Resolve start/end dates and cumulative escalation for every term.
///
/// Pure: the agreement is not modified.
pub fn resolve_terms<C: Calendar>(cal: &C, agreement: &Agreement) -> TermTimeline {
    let mut ordered: Vec<AgreementTerm> = agreement.agreement_terms.clone();
    ordered.sort_by_key(|t| t.term_ordinal);
    if ordered
        .windows(2)
        .any(|pair| pair[0].term_ordinal == pair[1].term_ordinal)
    {
        warn!(
            agreement_id = %agreement.id,
            "duplicate term ordinals; keeping document order within ties"
        );
    }

    let termination = agreement.termination_date();
    let construction = agreement.construction_commencement_date;
    let operations = agreement.operations_commencement_date;
    let earliest_ops = agreement.earliest_operational_commencement();
    let first_operational_ordinal = ordered
        .iter()
        .filter(|t| t.is_operational())
        .map(|t| t.term_ordinal)
        .min();

    let mut cursor = agreement.term_anchor_date();
    let mut terms = Vec::with_capacity(ordered.len());

    for term in ordered {
        let milestone = if term.extension {
            None
        } else if term.is_construction() {
            construction
        } else if term.is_operations() {
            operations
        } else {
            None
        };
        let pre_operational = !term.is_operational()
            && first_operational_ordinal.is_some_and(|first| term.term_ordinal < first);
        let truncating_milestone = if pre_operational {
            earliest_ops
        } else if term.is_construction() && !term.extension {
            operations
        } else {
            None
        };

        let mut resolved = ResolvedTerm::unresolved(term);

        let Some(start) = milestone.or(cursor) else {
            debug!(
                agreement_id = %agreement.id,
                term_ordinal = resolved.term.term_ordinal,
                "term has no resolvable start date"
            );
            resolved.skip_reason = Some(SkipReason::MissingStartDate);
            cursor = None;
            terms.push(resolved);
            continue;
        };
        resolved.start_date = Some(start);

        if termination.is_some_and(|t| start > t) {
            resolved.cancelled_by_termination = true;
            resolved.skip_reason = Some(SkipReason::CancelledByTermination);
            cursor = None;
            terms.push(resolved);
            continue;
        }

        let mut end = resolved
            .term
            .term_length_years
            .map(sanitize)
            .filter(|years| *years > 0.0)
            // A length under half a day still covers its start date
            .map(|years| cal.add_days(cal.add_fractional_years(start, years), -1).max(start));

        if let Some(milestone) = truncating_milestone {
            if milestone <= start {
                resolved.cancelled_by_ops = true;
            } else if end.map_or(true, |e| milestone <= e) {
                end = Some(cal.add_days(milestone, -1));
            }
        }
        // Termination caps whichever end survived, including a milestone end
        if let (Some(e), Some(t)) = (end, termination) {
            end = Some(e.min(t));
        }

        resolved.end_date = end;
        if resolved.cancelled_by_ops {
            resolved.skip_reason = Some(SkipReason::CancelledByOperations);
        } else if end.is_none() {
            resolved.skip_reason = Some(SkipReason::MissingEndDate);
        }
        cursor = end.map(|e| cal.add_days(e, 1));
        terms.push(resolved);
    }

    fold_cumulative(&mut terms);

    let final_term_end_date = terms.last().and_then(|t| t.end_date);
    TermTimeline {
        terms,
        final_term_end_date,
    }
}

/// Fold each term's escalation and increase over its model cohort.
fn fold_cumulative(terms: &mut [ResolvedTerm]) {
    let folded: Vec<(f64, f64)> = terms
        .iter()
        .map(|current| {
            terms
                .iter()
                .filter(|t| {
                    t.term.term_ordinal <= current.term.term_ordinal
                        && t.term
                            .model_key()
                            .eq_ignore_ascii_case(current.term.model_key())
                })
                .fold((1.0, 0.0), |(rate, amount), t| {
                    (
                        rate * (1.0 + num(t.term.escalation_rate)),
                        amount + num(t.term.increase_amount),
                    )
                })
        })
        .collect();

    for (term, (rate, amount)) in terms.iter_mut().zip(folded) {
        term.cumulative_escalation_rate = rate;
        term.cumulative_increase_amount = amount;
    }
}
