//! Date-anchored payment models
//!
//! Payments fixed to calendar dates rather than term boundaries: option
//! fees, signing bonuses, recurring payments between two dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::frequency::Frequency;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatePaymentModel {
    /// Identifier carried onto generated events; positional when empty
    pub model_id: String,

    /// Accounting classification, e.g. "Option Fee"
    pub payment_type: Option<String>,

    /// A single payment on this date. Takes precedence over the window.
    pub date_one_time: Option<NaiveDate>,

    pub date_begin: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,

    /// `None` is read as annual payment
    pub frequency: Option<Frequency>,

    pub payment_amount: Option<f64>,
    pub increase_amount: Option<f64>,
    pub periodic_escalation_rate: Option<f64>,

    pub first_payment_lag: Option<f64>,
    pub subsequent_payment_lag: Option<f64>,

    pub refundable: bool,
    pub applicable_to_purchase: bool,
}

impl DatePaymentModel {
    /// A single payment on `date`.
    pub fn one_time(model_id: impl Into<String>, date: NaiveDate, amount: f64) -> Self {
        Self {
            model_id: model_id.into(),
            date_one_time: Some(date),
            payment_amount: Some(amount),
            ..Default::default()
        }
    }

    /// A recurring payment from `begin`, optionally ending at `end`.
    pub fn recurring(
        model_id: impl Into<String>,
        begin: NaiveDate,
        end: Option<NaiveDate>,
        frequency: Frequency,
        amount: f64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            date_begin: Some(begin),
            date_end: end,
            frequency: Some(frequency),
            payment_amount: Some(amount),
            ..Default::default()
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency.clone().unwrap_or(Frequency::Annually)
    }

    pub fn is_one_time(&self) -> bool {
        self.date_one_time.is_some()
    }
}
