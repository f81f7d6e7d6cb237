//! Agreement model
//!
//! The root document record produced by the fact extraction layer: a lease,
//! option, easement, amendment, deed, letter or payment directive. Every
//! field defaults when absent so a sparse document still deserializes.
//!
//! An *original* agreement carries an `effective_date`; amendments, deeds and
//! letters in the same `agreement_group` carry one of the amendment-bearing
//! dates instead and are folded onto the original by the overlay merger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::date_model::DatePaymentModel;
use super::term::{AgreementTerm, TermPaymentModel};
use crate::core::growth::sanitize;

/// A payee on the agreement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grantor {
    pub name: String,

    /// Share of every payment, in percent (0-100). `None` shares the
    /// remainder equally with the other unspecified grantors.
    pub split_percentage: Option<f64>,
}

impl Grantor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            split_percentage: None,
        }
    }

    pub fn with_split(mut self, percentage: f64) -> Self {
        self.split_percentage = Some(percentage);
        self
    }
}

/// One parcel described by the agreement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDescription {
    pub parcel_id: String,
    pub acres: Option<f64>,

    /// Parcels flagged out of the controlled area (released, disputed, ...)
    pub excluded: bool,
}

/// Early termination of the agreement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Termination {
    pub termination_date: Option<NaiveDate>,
    pub notice_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// A land agreement document as extracted from its source record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agreement {
    /// Unique document identifier
    pub id: String,

    /// Key linking an original agreement to its amendments, deeds and letters
    pub agreement_group: String,

    pub document_type: String,

    /// Set on originals, `None` on amendments
    pub effective_date: Option<NaiveDate>,

    /// Explicit commencement of the first term, when it differs from the
    /// effective date
    pub commencement_date: Option<NaiveDate>,

    // Operational milestones
    pub construction_commencement_date: Option<NaiveDate>,
    pub operations_commencement_date: Option<NaiveDate>,

    // Amendment-bearing dates
    pub amendment_date: Option<NaiveDate>,
    pub letter_date: Option<NaiveDate>,
    pub deed_date: Option<NaiveDate>,
    pub payment_directive_date: Option<NaiveDate>,
    pub recorded_date: Option<NaiveDate>,

    pub outside_date: Option<NaiveDate>,
    pub estimated_closing_date: Option<NaiveDate>,
    pub date_purchased: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,

    pub full_purchase_price: Option<f64>,

    pub jupiter_entity: Option<String>,
    pub grantee: Option<String>,
    pub review_status: Option<String>,

    pub grantor: Vec<Grantor>,
    pub agreement_terms: Vec<AgreementTerm>,
    pub term_payment_models: Vec<TermPaymentModel>,
    pub date_payment_models: Vec<DatePaymentModel>,
    pub termination: Option<Termination>,
    pub property_description: Vec<PropertyDescription>,
}

impl Agreement {
    /// Create an empty agreement with the given identity.
    pub fn new(id: impl Into<String>, agreement_group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agreement_group: agreement_group.into(),
            ..Default::default()
        }
    }

    /// Sum of parcel acreage, skipping parcels flagged as excluded.
    pub fn total_controlled_acres(&self) -> f64 {
        self.property_description
            .iter()
            .filter(|p| !p.excluded)
            .map(|p| p.acres.map(sanitize).unwrap_or(0.0))
            .sum()
    }

    pub fn termination_date(&self) -> Option<NaiveDate> {
        self.termination.as_ref().and_then(|t| t.termination_date)
    }

    /// Purchase date if known, otherwise the estimated closing date.
    pub fn closing_date(&self) -> Option<NaiveDate> {
        self.date_purchased.or(self.estimated_closing_date)
    }

    /// Anchor for the first term.
    pub fn term_anchor_date(&self) -> Option<NaiveDate> {
        self.commencement_date.or(self.effective_date)
    }

    /// Earliest of the construction and operations commencement dates.
    pub fn earliest_operational_commencement(&self) -> Option<NaiveDate> {
        match (
            self.construction_commencement_date,
            self.operations_commencement_date,
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Operative date of an amending document: the first non-null of
    /// amendment, letter, deed, payment directive and recorded dates.
    pub fn amendment_sort_date(&self) -> Option<NaiveDate> {
        self.amendment_date
            .or(self.letter_date)
            .or(self.deed_date)
            .or(self.payment_directive_date)
            .or(self.recorded_date)
    }

    /// True when the document carries any amendment-bearing date.
    pub fn carries_amendment_date(&self) -> bool {
        self.amendment_sort_date().is_some()
    }

    /// Originals are the documents amendments are folded onto.
    pub fn is_original(&self) -> bool {
        self.effective_date.is_some()
    }
}
