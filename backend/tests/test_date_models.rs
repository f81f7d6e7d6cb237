//! Date-based schedule tests
//!
//! One-time and recurring payments anchored to calendar dates.

use agreement_schedule_core_rs::core::{Frequency, GregorianCalendar};
use agreement_schedule_core_rs::models::{
    Agreement, DatePaymentModel, Grantor, PaymentEvent, PaymentSource, Termination,
};
use agreement_schedule_core_rs::orchestrator::EngineConfig;
use agreement_schedule_core_rs::schedule::{generate_date_payments, ScheduleContext};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected}, got {actual}"
    );
}

fn agreement_with(models: Vec<DatePaymentModel>) -> Agreement {
    let mut agreement = Agreement::new("OPT-1", "G-1");
    agreement.effective_date = Some(d(2024, 1, 1));
    agreement.grantor = vec![Grantor::new("Smith")];
    agreement.date_payment_models = models;
    agreement
}

fn generate(agreement: &Agreement) -> Vec<PaymentEvent> {
    generate_with(agreement, &EngineConfig::default())
}

fn generate_with(agreement: &Agreement, config: &EngineConfig) -> Vec<PaymentEvent> {
    let ctx = ScheduleContext::new(agreement, config);
    generate_date_payments(&GregorianCalendar, &ctx, &agreement.date_payment_models)
}

#[test]
fn test_one_time_payment() {
    let mut model = DatePaymentModel::one_time("signing-bonus", d(2024, 5, 1), 5000.0);
    model.payment_type = Some("Signing Bonus".to_string());
    model.first_payment_lag = Some(15.0);
    let agreement = agreement_with(vec![model]);

    let events = generate(&agreement);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payment_source, PaymentSource::DateModelOneTime);
    assert_eq!(events[0].payment_date, d(2024, 5, 1));
    assert_eq!(events[0].late_payment_date, Some(d(2024, 5, 16)));
    assert_eq!(events[0].payment_type, "Signing Bonus");
    assert_eq!(events[0].payment_amount, 5000.0);
    assert_eq!(events[0].model_id, "signing-bonus");
}

#[test]
fn test_recurring_with_increase_and_escalation() {
    let mut model = DatePaymentModel::recurring(
        "option-fee",
        d(2024, 1, 1),
        Some(d(2026, 12, 31)),
        Frequency::Annually,
        1000.0,
    );
    model.increase_amount = Some(100.0);
    model.periodic_escalation_rate = Some(0.05);
    let agreement = agreement_with(vec![model]);

    let events = generate(&agreement);

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].payment_date, d(2024, 1, 1));
    assert_eq!(events[1].payment_date, d(2025, 1, 1));
    assert_eq!(events[2].payment_date, d(2026, 1, 1));
    // Period n pays (1000 + 100 × (n - 1)) × 1.05^n
    assert_close(events[0].payment_amount, 1050.0);
    assert_close(events[1].payment_amount, 1212.75);
    assert_close(events[2].payment_amount, 1389.15);
    assert!(events.iter().all(|e| e.payment_source == PaymentSource::DateModel));
    assert_eq!(events[0].period_end, Some(d(2024, 12, 31)));
    assert_eq!(events[0].payment_type, "Date Payment");
}

#[test]
fn test_first_recurring_payment_is_escalated() {
    let mut model = DatePaymentModel::recurring(
        "rent",
        d(2024, 1, 1),
        Some(d(2025, 12, 31)),
        Frequency::Annually,
        1000.0,
    );
    model.increase_amount = Some(100.0);
    model.periodic_escalation_rate = Some(0.10);
    let agreement = agreement_with(vec![model]);

    let amounts: Vec<f64> = generate(&agreement).iter().map(|e| e.payment_amount).collect();
    assert_eq!(amounts.len(), 2);
    assert_close(amounts[0], 1100.0);
    assert_close(amounts[1], 1331.0);
}

#[test]
fn test_unescalated_recurring_pays_face_amount() {
    let agreement = agreement_with(vec![DatePaymentModel::recurring(
        "rent",
        d(2024, 1, 1),
        Some(d(2025, 12, 31)),
        Frequency::Annually,
        750.0,
    )]);

    let events = generate(&agreement);
    assert!(events.iter().all(|e| e.payment_amount == 750.0));
}

#[test]
fn test_monthly_steps_from_begin_date() {
    let agreement = agreement_with(vec![DatePaymentModel::recurring(
        "monthly",
        d(2024, 1, 31),
        Some(d(2024, 4, 30)),
        Frequency::Monthly,
        100.0,
    )]);

    let dates: Vec<NaiveDate> = generate(&agreement).iter().map(|e| e.payment_date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
    );
}

#[test]
fn test_unrecognized_frequency_stops_only_that_model() {
    let mut weekly = DatePaymentModel::recurring("weekly", d(2024, 1, 1), None, Frequency::Annually, 10.0);
    weekly.frequency = Some(Frequency::parse("Weekly"));
    let agreement = agreement_with(vec![
        weekly,
        DatePaymentModel::one_time("fee", d(2024, 2, 1), 250.0),
    ]);

    let events = generate(&agreement);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].model_id, "fee");
}

#[test]
fn test_recurring_bounded_by_termination() {
    let mut agreement = agreement_with(vec![DatePaymentModel::recurring(
        "rent",
        d(2024, 1, 1),
        None,
        Frequency::Annually,
        1000.0,
    )]);
    agreement.termination = Some(Termination {
        termination_date: Some(d(2025, 6, 30)),
        ..Default::default()
    });

    let events = generate(&agreement);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].payment_date, d(2025, 1, 1));
    assert_eq!(events[1].period_end, Some(d(2025, 6, 30)));
}

#[test]
fn test_one_time_after_termination_is_dropped() {
    let mut agreement = agreement_with(vec![DatePaymentModel::one_time("late", d(2026, 1, 1), 100.0)]);
    agreement.termination = Some(Termination {
        termination_date: Some(d(2025, 1, 1)),
        ..Default::default()
    });

    assert!(generate(&agreement).is_empty());
}

#[test]
fn test_recurring_bounded_by_closing() {
    let mut agreement = agreement_with(vec![DatePaymentModel::recurring(
        "rent",
        d(2024, 1, 1),
        None,
        Frequency::Quarterly,
        250.0,
    )]);
    agreement.estimated_closing_date = Some(d(2024, 8, 1));

    let events = generate(&agreement);
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].payment_date, d(2024, 7, 1));
}

#[test]
fn test_open_ended_model_hits_period_limit() {
    let agreement = agreement_with(vec![DatePaymentModel::recurring(
        "rent",
        d(2024, 1, 1),
        None,
        Frequency::Monthly,
        100.0,
    )]);
    let config = EngineConfig {
        max_periods_per_model: 5,
        ..EngineConfig::default()
    };

    assert_eq!(generate_with(&agreement, &config).len(), 5);
}

#[test]
fn test_subsequent_lag_on_later_payments() {
    let mut model = DatePaymentModel::recurring(
        "rent",
        d(2024, 1, 1),
        Some(d(2025, 12, 31)),
        Frequency::Annually,
        100.0,
    );
    model.first_payment_lag = Some(30.0);
    model.subsequent_payment_lag = Some(5.0);
    let agreement = agreement_with(vec![model]);

    let events = generate(&agreement);
    assert_eq!(events[0].late_payment_date, Some(d(2024, 1, 31)));
    assert_eq!(events[1].late_payment_date, Some(d(2025, 1, 6)));
}

#[test]
fn test_positional_model_ids_and_sorting() {
    let agreement = agreement_with(vec![
        DatePaymentModel::one_time("", d(2024, 9, 1), 10.0),
        DatePaymentModel::one_time("", d(2024, 3, 1), 20.0),
    ]);

    let events = generate(&agreement);
    assert_eq!(events[0].payment_date, d(2024, 3, 1));
    assert_eq!(events[0].model_id, "date-model-1");
    assert_eq!(events[1].model_id, "date-model-0");
}

#[test]
fn test_no_grantors_no_events() {
    let mut agreement = agreement_with(vec![DatePaymentModel::one_time("fee", d(2024, 2, 1), 250.0)]);
    agreement.grantor.clear();

    assert!(generate(&agreement).is_empty());
}
