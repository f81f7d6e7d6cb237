//! Standard term schedule
//!
//! Steps through a resolved term one payment period at a time.
//!
//! # Algorithm
//!
//! ```text
//! base = max(minimum, per_mw × mw, inverters × rating × per_mva, flat, per_acre × acres)
//! term_base = (base + cumulative_increase) × cumulative_escalation
//!
//! for period i while period_start < term_end and period_start <= closing:
//!     e      = floor(i × escalation_ratio)
//!     amount = compound(term_base + increase × e, rate, e) × prorata
//!     emit one event per payee
//!     period_start = period_end + 1
//! ```
//!
//! The loop is bounded by the term end, the closing date and
//! `EngineConfig::max_periods_per_model`.

use tracing::warn;

use super::period::{period_end, prorata_fraction, PeriodAlignment};
use super::terms::ResolvedTerm;
use super::{first_payment_date, lagged_date, ScheduleContext, SkipReason};
use crate::core::calendar::Calendar;
use crate::core::frequency::escalation_ratio;
use crate::core::growth::{compounding_growth, num};
use crate::models::payment::{PaymentDraft, PaymentEvent, PaymentSource};
use crate::models::term::TermPaymentModel;

/// Largest of the model's applicable payment bases, before escalation.
///
/// # Example
/// ```
/// use agreement_schedule_core_rs::core::Frequency;
/// use agreement_schedule_core_rs::models::TermPaymentModel;
/// use agreement_schedule_core_rs::schedule::standard::base_payment;
///
/// let mut model = TermPaymentModel::new("Operations", Frequency::Annually);
/// model.payment_per_acre = Some(10.0);
/// assert_eq!(base_payment(&model, 50.0), 500.0);
/// ```
pub fn base_payment(model: &TermPaymentModel, controlled_acres: f64) -> f64 {
    let acres = model.acres.map(|a| num(Some(a))).unwrap_or(controlled_acres);
    [
        num(model.minimum_payment),
        num(model.payment_per_mw) * num(model.megawatts),
        num(model.inverter_count) * num(model.inverter_rating_mva) * num(model.payment_per_mva),
        num(model.flat_payment_amount),
        num(model.payment_per_acre) * acres,
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

/// Base payment for a term after term-level increase and escalation.
pub fn term_base_payment(model: &TermPaymentModel, term: &ResolvedTerm, controlled_acres: f64) -> f64 {
    (base_payment(model, controlled_acres) + term.cumulative_increase_amount)
        * term.cumulative_escalation_rate
}

/// Identifier carried on a term's events. Includes the ordinal because
/// several terms can share one model.
pub fn term_model_id(model: &TermPaymentModel, term: &ResolvedTerm) -> String {
    format!("{}/{}", model.model_type.trim(), term.term.term_ordinal)
}

/// Whether payment lags apply to this term.
pub fn lag_applies(model: &TermPaymentModel, term: &ResolvedTerm) -> bool {
    !term.term.extension || model.apply_payment_lag_to_extension
}

pub fn generate_standard<C: Calendar>(
    cal: &C,
    ctx: &ScheduleContext<'_>,
    term: &ResolvedTerm,
    model: &TermPaymentModel,
) -> Result<Vec<PaymentEvent>, SkipReason> {
    let start = term.start_date.ok_or(SkipReason::MissingStartDate)?;
    let end = term.end_date.ok_or(SkipReason::MissingEndDate)?;

    let frequency = model.frequency();
    let escalation_frequency = model
        .periodic_escalation_frequency
        .clone()
        .unwrap_or_else(|| ctx.config.default_escalation_frequency.clone());
    let Some(ratio) = escalation_ratio(&frequency, &escalation_frequency) else {
        warn!(
            agreement_id = %ctx.agreement_id,
            term_ordinal = term.term.term_ordinal,
            frequency = %frequency,
            escalation_frequency = %escalation_frequency,
            "unrecognized frequency; term not scheduled"
        );
        return Err(SkipReason::UnrecognizedFrequency);
    };

    let alignment = PeriodAlignment::from_prorated(model.prorated_first_period);
    let term_base = term_base_payment(model, term, ctx.controlled_acres);
    let rate = num(model.periodic_escalation_rate);
    let increase = num(model.increase_amount);
    let with_lag = lag_applies(model, term);
    let model_id = term_model_id(model, term);
    let payment_type = model.model_type.trim().to_string();

    let mut events = Vec::new();
    let mut period_start = start;
    let mut payment_date = first_payment_date(cal, start, &term.term.first_payment_start);
    let mut index = 0usize;

    while period_start < end && ctx.before_closing(period_start) {
        if index >= ctx.config.max_periods_per_model {
            warn!(
                agreement_id = %ctx.agreement_id,
                model_id = %model_id,
                "period limit reached; schedule truncated"
            );
            break;
        }
        let Some(period_close) = period_end(cal, period_start, &frequency, alignment, end) else {
            break;
        };
        let prorata = prorata_fraction(
            cal,
            period_start,
            period_close,
            &frequency,
            ctx.config.prorata_decimals,
        );
        let elapsed = (index as f64 * ratio).floor();
        let amount = compounding_growth(term_base + increase * elapsed, rate, elapsed) * prorata;

        let lag = if index == 0 {
            model.first_payment_lag
        } else {
            model.subsequent_payment_lag
        };
        let draft = PaymentDraft {
            source: PaymentSource::TermModel,
            model_id: model_id.clone(),
            payment_index: index,
            payment_date,
            late_payment_date: if with_lag {
                lagged_date(cal, payment_date, lag)
            } else {
                None
            },
            payment_type: payment_type.clone(),
            total_amount: amount,
            period_start: Some(period_start),
            period_end: Some(period_close),
            prorata_factor: prorata,
            applicable_to_purchase: model.applicable_to_purchase,
            refundable: model.refundable,
        };
        events.extend(ctx.emit(&draft, model.payee_override()));

        period_start = cal.add_days(period_close, 1);
        payment_date = period_start;
        index += 1;
    }

    Ok(events)
}
