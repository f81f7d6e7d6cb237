//! Date-based schedule
//!
//! Generates payments for calendar-anchored models, independently of terms.
//!
//! - A one-time model pays once on `date_one_time`
//! - A recurring model pays from `date_begin`, stepping by its frequency,
//!   while the payment date is on or before the earliest of the
//!   termination date and `date_end`, and not past the purchase closing
//!
//! Period `n` (1-based) pays
//! `compound(payment_amount + increase_amount × (n - 1), escalation_rate, n)`,
//! so even the first recurring payment carries one period of escalation.
//!
//! An unrecognized frequency stops that model only; the other models on the
//! agreement are still scheduled.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{lagged_date, ScheduleContext};
use crate::core::calendar::Calendar;
use crate::core::frequency::Frequency;
use crate::core::growth::{compounding_growth, num};
use crate::models::date_model::DatePaymentModel;
use crate::models::payment::{sort_by_payment_date, PaymentDraft, PaymentEvent, PaymentSource};

const DEFAULT_PAYMENT_TYPE: &str = "Date Payment";

/// Generate events for every date model, sorted by payment date.
pub fn generate_date_payments<C: Calendar>(
    cal: &C,
    ctx: &ScheduleContext<'_>,
    models: &[DatePaymentModel],
) -> Vec<PaymentEvent> {
    if !ctx.has_payees() {
        if !models.is_empty() {
            debug!(agreement_id = %ctx.agreement_id, "no payees; date models not scheduled");
        }
        return Vec::new();
    }

    let mut events: Vec<PaymentEvent> = models
        .iter()
        .enumerate()
        .flat_map(|(position, model)| generate_model(cal, ctx, model, position))
        .collect();
    sort_by_payment_date(&mut events);
    events
}

fn model_id(model: &DatePaymentModel, position: usize) -> String {
    let id = model.model_id.trim();
    if id.is_empty() {
        format!("date-model-{}", position)
    } else {
        id.to_string()
    }
}

fn generate_model<C: Calendar>(
    cal: &C,
    ctx: &ScheduleContext<'_>,
    model: &DatePaymentModel,
    position: usize,
) -> Vec<PaymentEvent> {
    let id = model_id(model, position);
    let payment_type = model
        .payment_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_PAYMENT_TYPE)
        .to_string();
    let within_termination =
        |date: NaiveDate| ctx.termination_date.map_or(true, |t| date <= t);

    if let Some(date) = model.date_one_time {
        if !within_termination(date) || !ctx.before_closing(date) {
            return Vec::new();
        }
        let draft = PaymentDraft {
            source: PaymentSource::DateModelOneTime,
            model_id: id,
            payment_index: 0,
            payment_date: date,
            late_payment_date: lagged_date(cal, date, model.first_payment_lag),
            payment_type,
            total_amount: num(model.payment_amount),
            period_start: None,
            period_end: None,
            prorata_factor: 1.0,
            applicable_to_purchase: model.applicable_to_purchase,
            refundable: model.refundable,
        };
        return ctx.emit(&draft, None);
    }

    let Some(begin) = model.date_begin else {
        debug!(agreement_id = %ctx.agreement_id, model_id = %id, "date model has no dates");
        return Vec::new();
    };
    let frequency = model.frequency();
    if !frequency.is_recognized() {
        warn!(
            agreement_id = %ctx.agreement_id,
            model_id = %id,
            frequency = %frequency,
            "unrecognized frequency; date model not scheduled"
        );
        return Vec::new();
    }

    let limit = match (ctx.termination_date, model.date_end) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    let amount = num(model.payment_amount);
    let increase = num(model.increase_amount);
    let rate = num(model.periodic_escalation_rate);

    let mut events = Vec::new();
    let mut date = begin;
    let mut k = 0usize;

    while limit.map_or(true, |l| date <= l) && ctx.before_closing(date) {
        if k >= ctx.config.max_periods_per_model {
            warn!(
                agreement_id = %ctx.agreement_id,
                model_id = %id,
                "period limit reached; date model truncated"
            );
            break;
        }
        let next = match frequency {
            Frequency::OncePerTerm => None,
            _ => frequency
                .months()
                .map(|m| cal.add_months(begin, ((k as i64 + 1) * m as i64).min(i32::MAX as i64) as i32)),
        };
        let period_end = next.map(|n| {
            let close = cal.add_days(n, -1);
            limit.map_or(close, |l| close.min(l))
        });

        let kf = k as f64;
        let lag = if k == 0 {
            model.first_payment_lag
        } else {
            model.subsequent_payment_lag
        };
        let draft = PaymentDraft {
            source: PaymentSource::DateModel,
            model_id: id.clone(),
            payment_index: k,
            payment_date: date,
            late_payment_date: lagged_date(cal, date, lag),
            payment_type: payment_type.clone(),
            total_amount: compounding_growth(amount + increase * kf, rate, kf + 1.0),
            period_start: Some(date),
            period_end,
            prorata_factor: 1.0,
            applicable_to_purchase: model.applicable_to_purchase,
            refundable: model.refundable,
        };
        events.extend(ctx.emit(&draft, None));

        match next {
            Some(n) if n > date => date = n,
            _ => break,
        }
        k += 1;
    }

    events
}
