//! Blended term schedule
//!
//! Used when a model prorates its first period *and* escalates periodically.
//! Calendar-aligned payment periods then straddle escalation anniversaries,
//! which are anchored on the start of the earliest term sharing the model.
//!
//! Each payment period is cut into segments at escalation boundaries. A
//! segment contributes `escalated_base(k) × days / full_period_days`, where
//! `k` is the number of escalation anniversaries passed at the segment start
//! and `full_period_days` is the length of the calendar period of the
//! payment frequency. The payment is the sum of its segments; its prorata
//! factor is the sum of segment weights.

use chrono::NaiveDate;
use tracing::warn;

use super::period::{natural_period, period_end, PeriodAlignment};
use super::standard::{generate_standard, lag_applies, term_base_payment, term_model_id};
use super::terms::ResolvedTerm;
use super::{first_payment_date, lagged_date, ScheduleContext, SkipReason};
use crate::core::calendar::{month_distance, Calendar};
use crate::core::frequency::Frequency;
use crate::core::growth::{compounding_growth, num, round_to};
use crate::models::payment::{PaymentDraft, PaymentEvent, PaymentSource};
use crate::models::term::TermPaymentModel;

/// Number of escalation anniversaries of `anchor` on or before `date`.
pub fn escalation_index<C: Calendar>(cal: &C, anchor: NaiveDate, date: NaiveDate, months: u32) -> u32 {
    if date < anchor || months == 0 {
        return 0;
    }
    let step = months as i64;
    let boundary = |k: i64| cal.add_months(anchor, (k * step).clamp(0, i32::MAX as i64) as i32);

    let mut k = (month_distance(anchor, date) / step).max(0);
    while k > 0 && boundary(k) > date {
        k -= 1;
    }
    while boundary(k + 1) <= date {
        k += 1;
    }
    k.clamp(0, u32::MAX as i64) as u32
}

pub fn generate_blended<C: Calendar>(
    cal: &C,
    ctx: &ScheduleContext<'_>,
    term: &ResolvedTerm,
    model: &TermPaymentModel,
    anchor: NaiveDate,
) -> Result<Vec<PaymentEvent>, SkipReason> {
    let start = term.start_date.ok_or(SkipReason::MissingStartDate)?;
    let end = term.end_date.ok_or(SkipReason::MissingEndDate)?;

    let frequency = model.frequency();
    let escalation_frequency = model
        .periodic_escalation_frequency
        .clone()
        .unwrap_or_else(|| ctx.config.default_escalation_frequency.clone());
    if !frequency.is_recognized() || !escalation_frequency.is_recognized() {
        warn!(
            agreement_id = %ctx.agreement_id,
            term_ordinal = term.term.term_ordinal,
            frequency = %frequency,
            escalation_frequency = %escalation_frequency,
            "unrecognized frequency; term not scheduled"
        );
        return Err(SkipReason::UnrecognizedFrequency);
    }
    // No anniversaries to straddle
    let Some(escalation_months) = escalation_frequency.months() else {
        return generate_standard(cal, ctx, term, model);
    };

    let term_base = term_base_payment(model, term, ctx.controlled_acres);
    let rate = num(model.periodic_escalation_rate);
    let increase = num(model.increase_amount);
    let with_lag = lag_applies(model, term);
    let model_id = term_model_id(model, term);
    let payment_type = model.model_type.trim().to_string();
    let term_days = (cal.days_between(start, end) + 1).max(1) as f64;

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
        let Some(period_close) =
            period_end(cal, period_start, &frequency, PeriodAlignment::ProRated, end)
        else {
            break;
        };
        let full_days = match frequency {
            Frequency::OncePerTerm => term_days,
            _ => {
                let months = frequency.months().unwrap_or(12);
                let (first, last) = natural_period(cal, period_start, months);
                (cal.days_between(first, last) + 1).max(1) as f64
            }
        };

        let mut amount = 0.0;
        let mut weight = 0.0;
        let mut segment_start = period_start;
        loop {
            let k = escalation_index(cal, anchor, segment_start, escalation_months);
            let next_boundary = cal.add_months(
                anchor,
                ((k as i64 + 1) * escalation_months as i64).min(i32::MAX as i64) as i32,
            );
            let segment_end = period_close.min(cal.add_days(next_boundary, -1));
            let segment_weight = (cal.days_between(segment_start, segment_end) + 1) as f64 / full_days;
            let k = k as f64;
            amount += compounding_growth(term_base + increase * k, rate, k) * segment_weight;
            weight += segment_weight;

            if segment_end >= period_close {
                break;
            }
            segment_start = cal.add_days(segment_end, 1);
        }

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
            prorata_factor: round_to(weight, ctx.config.prorata_decimals),
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
