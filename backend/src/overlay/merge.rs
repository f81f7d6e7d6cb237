//! Amendment fold
//!
//! # Selection
//!
//! Candidates share the base's `agreement_group`, carry at least one
//! amendment-bearing date (amendment, letter, deed, payment directive,
//! recorded) and are not the base itself. Each is ordered by its operative
//! sort date, the first non-null of those dates in that order. Amendment
//! ordinals (1-based) are assigned by sort date among candidates with an
//! explicit amendment date.
//!
//! # Merge precedence
//!
//! Folded in ascending sort-date order:
//!
//! - **Overwrite**: scalar and collection fields take the later amendment's
//!   value, but only when the amendment supplies a non-empty one
//! - **Additive**: `date_payment_models` from every amendment are appended
//!
//! # Critical Invariants
//!
//! 1. The base document is never modified; the effective view is a new value
//! 2. An amendment is folded at most once per view (tracked by id), so
//!    re-applying the overlay never duplicates additive models
//! 3. Bases without an effective date are not overlaid

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::index::AgreementIndex;
use crate::models::agreement::Agreement;

/// An amendment as positioned in its chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmendmentSummary {
    pub id: String,
    pub document_type: String,
    pub sort_date: NaiveDate,

    /// Position among documents with an explicit amendment date
    pub ordinal: Option<u32>,

    pub deed_date: Option<NaiveDate>,
}

/// An original agreement with its amendments folded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveAgreement {
    pub agreement: Agreement,

    /// Applied amendments in fold order
    pub amendments: Vec<AmendmentSummary>,
}

impl EffectiveAgreement {
    /// A view of `base` with nothing applied yet.
    pub fn from_base(base: &Agreement) -> Self {
        Self {
            agreement: base.clone(),
            amendments: Vec::new(),
        }
    }

    pub fn is_applied(&self, amendment_id: &str) -> bool {
        self.amendments.iter().any(|a| a.id == amendment_id)
    }

    pub fn applied_amendment_ids(&self) -> Vec<String> {
        self.amendments.iter().map(|a| a.id.clone()).collect()
    }

    /// Latest deed date across the base and its applied amendments.
    pub fn deed_effective_date(&self) -> Option<NaiveDate> {
        self.amendments
            .iter()
            .filter_map(|a| a.deed_date)
            .chain(self.agreement.deed_date)
            .max()
    }
}

/// Amendments of `base` in fold order, with their summaries.
pub fn ordered_amendments<'a>(
    base: &Agreement,
    index: &AgreementIndex<'a>,
) -> Vec<(&'a Agreement, AmendmentSummary)> {
    let mut candidates: Vec<(&'a Agreement, NaiveDate)> = index
        .group(&base.agreement_group)
        .iter()
        .filter(|doc| doc.id != base.id)
        .filter_map(|doc| doc.amendment_sort_date().map(|date| (*doc, date)))
        .collect();
    candidates.sort_by(|(a, a_date), (b, b_date)| a_date.cmp(b_date).then_with(|| a.id.cmp(&b.id)));

    let mut next_ordinal = 1u32;
    candidates
        .into_iter()
        .map(|(doc, sort_date)| {
            let ordinal = doc.amendment_date.map(|_| {
                let ordinal = next_ordinal;
                next_ordinal += 1;
                ordinal
            });
            let summary = AmendmentSummary {
                id: doc.id.clone(),
                document_type: doc.document_type.clone(),
                sort_date,
                ordinal,
                deed_date: doc.deed_date,
            };
            (doc, summary)
        })
        .collect()
}

/// Build the effective view of `base`.
pub fn apply_overlay(base: &Agreement, index: &AgreementIndex<'_>) -> EffectiveAgreement {
    overlay_onto(EffectiveAgreement::from_base(base), index)
}

/// Fold any not-yet-applied amendments onto an existing view.
pub fn overlay_onto(mut view: EffectiveAgreement, index: &AgreementIndex<'_>) -> EffectiveAgreement {
    if view.agreement.effective_date.is_none() {
        debug!(
            agreement_id = %view.agreement.id,
            "no effective date; amendment overlay skipped"
        );
        return view;
    }

    for (amendment, summary) in ordered_amendments(&view.agreement, index) {
        if view.is_applied(&amendment.id) {
            continue;
        }
        merge_amendment(&mut view.agreement, amendment);
        view.amendments.push(summary);
    }
    view
}

fn overwrite<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        field.clone_from(value);
    }
}

fn overwrite_text(field: &mut Option<String>, value: &Option<String>) {
    if value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        field.clone_from(value);
    }
}

fn overwrite_list<T: Clone>(field: &mut Vec<T>, value: &[T]) {
    if !value.is_empty() {
        *field = value.to_vec();
    }
}

/// Fold one amendment onto the view.
pub fn merge_amendment(view: &mut Agreement, amendment: &Agreement) {
    overwrite(&mut view.effective_date, &amendment.effective_date);
    overwrite(&mut view.commencement_date, &amendment.commencement_date);
    overwrite(
        &mut view.construction_commencement_date,
        &amendment.construction_commencement_date,
    );
    overwrite(
        &mut view.operations_commencement_date,
        &amendment.operations_commencement_date,
    );
    overwrite(&mut view.outside_date, &amendment.outside_date);
    overwrite(&mut view.estimated_closing_date, &amendment.estimated_closing_date);
    overwrite(&mut view.date_purchased, &amendment.date_purchased);
    overwrite(&mut view.date_sold, &amendment.date_sold);
    if amendment.full_purchase_price.is_some_and(f64::is_finite) {
        view.full_purchase_price = amendment.full_purchase_price;
    }

    overwrite_text(&mut view.jupiter_entity, &amendment.jupiter_entity);
    overwrite_text(&mut view.grantee, &amendment.grantee);
    overwrite_text(&mut view.review_status, &amendment.review_status);

    overwrite_list(&mut view.property_description, &amendment.property_description);
    overwrite_list(&mut view.grantor, &amendment.grantor);
    overwrite_list(&mut view.agreement_terms, &amendment.agreement_terms);
    overwrite_list(&mut view.term_payment_models, &amendment.term_payment_models);

    if let Some(termination) = &amendment.termination {
        if termination.termination_date.is_some() || termination.reason.is_some() {
            view.termination = Some(termination.clone());
        }
    }

    view.date_payment_models
        .extend(amendment.date_payment_models.iter().cloned());
}
