//! Standard term schedule tests
//!
//! Period stepping, base payment selection, escalation, lags and payee
//! fan-out for terms paid by the standard generator.

use agreement_schedule_core_rs::core::{FirstPaymentStart, Frequency, GregorianCalendar};
use agreement_schedule_core_rs::models::{
    Agreement, AgreementTerm, Grantor, PaymentSource, PropertyDescription, TermPaymentModel,
};
use agreement_schedule_core_rs::orchestrator::EngineConfig;
use agreement_schedule_core_rs::schedule::{resolve_terms, schedule_terms, ScheduleContext, SkipReason};
use agreement_schedule_core_rs::TermTimeline;
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

fn lease(terms: Vec<AgreementTerm>, models: Vec<TermPaymentModel>) -> Agreement {
    let mut agreement = Agreement::new("LEASE-1", "G-1");
    agreement.effective_date = Some(d(2024, 1, 1));
    agreement.grantor = vec![Grantor::new("Smith")];
    agreement.agreement_terms = terms;
    agreement.term_payment_models = models;
    agreement
}

fn flat_model(model_type: &str, frequency: Frequency, amount: f64) -> TermPaymentModel {
    let mut model = TermPaymentModel::new(model_type, frequency);
    model.flat_payment_amount = Some(amount);
    model
}

fn schedule(agreement: &Agreement) -> TermTimeline {
    schedule_with(agreement, &EngineConfig::default())
}

fn schedule_with(agreement: &Agreement, config: &EngineConfig) -> TermTimeline {
    let cal = GregorianCalendar;
    let ctx = ScheduleContext::new(agreement, config);
    let timeline = resolve_terms(&cal, agreement);
    schedule_terms(&cal, &ctx, &agreement.term_payment_models, timeline)
}

// ============================================================================
// Period stepping
// ============================================================================

#[test]
fn test_monthly_option_year() {
    let agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(1.0)],
        vec![flat_model("Option", Frequency::Monthly, 1200.0)],
    );

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events.len(), 12);
    for (month, event) in (1..=12).zip(events) {
        assert_eq!(event.payment_date, d(2024, month, 1));
        assert_eq!(event.payment_amount, 1200.0);
        assert_eq!(event.payment_source, PaymentSource::TermModel);
        assert_eq!(event.prorata_factor, 1.0);
        assert_eq!(event.payee, "Smith");
    }
    assert_eq!(events[11].period_end, Some(d(2024, 12, 31)));
}

#[test]
fn test_annual_per_acre_payment() {
    let mut agreement = lease(
        vec![AgreementTerm::new(1, "Operations").with_length_years(1.0)],
        vec![{
            let mut model = TermPaymentModel::new("Operations", Frequency::Annually);
            model.payment_per_acre = Some(10.0);
            model.minimum_payment = Some(100.0);
            model
        }],
    );
    agreement.property_description = vec![
        PropertyDescription {
            parcel_id: "P-1".to_string(),
            acres: Some(30.0),
            excluded: false,
        },
        PropertyDescription {
            parcel_id: "P-2".to_string(),
            acres: Some(20.0),
            excluded: false,
        },
        PropertyDescription {
            parcel_id: "P-3".to_string(),
            acres: Some(1000.0),
            excluded: true,
        },
    ];

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payment_amount, 500.0);
    assert_eq!(events[0].period_start, Some(d(2024, 1, 1)));
    assert_eq!(events[0].period_end, Some(d(2024, 12, 31)));
}

#[test]
fn test_largest_rate_wins() {
    let agreement = lease(
        vec![AgreementTerm::new(1, "Operations").with_length_years(1.0)],
        vec![{
            let mut model = TermPaymentModel::new("Operations", Frequency::Annually);
            model.minimum_payment = Some(5000.0);
            model.payment_per_mw = Some(1000.0);
            model.megawatts = Some(8.0);
            model
        }],
    );

    let timeline = schedule(&agreement);
    assert_eq!(timeline.terms[0].periodic_payments[0].payment_amount, 8000.0);
}

#[test]
fn test_prorated_periods_follow_january_policy() {
    let mut term = AgreementTerm::new(1, "Operations").with_length_years(2.0);
    term.first_payment_start = FirstPaymentStart::FollowingJanuary;
    let mut model = flat_model("Operations", Frequency::Annually, 1000.0);
    model.prorated_first_period = true;
    let mut agreement = lease(vec![term], vec![model]);
    agreement.effective_date = Some(d(2024, 3, 15));

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].period_end, Some(d(2024, 12, 31)));
    assert_eq!(events[0].prorata_factor, 0.8);
    assert_eq!(events[0].payment_date, d(2025, 1, 1));
    assert_close(events[0].payment_amount, 800.0);

    assert_eq!(events[1].payment_date, d(2025, 1, 1));
    assert_close(events[1].payment_amount, 1000.0);

    // 2026-01-01 .. 2026-03-14 is 73 days
    assert_eq!(events[2].period_end, Some(d(2026, 3, 14)));
    assert_eq!(events[2].prorata_factor, 0.2);
    assert_close(events[2].payment_amount, 200.0);
}

#[test]
fn test_bounded_by_closing_date() {
    let mut agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(1.0)],
        vec![flat_model("Option", Frequency::Monthly, 1200.0)],
    );
    agreement.date_purchased = Some(d(2024, 6, 15));

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|e| e.payment_date <= d(2024, 6, 15)));
}

#[test]
fn test_bounded_by_period_limit() {
    let agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(5.0)],
        vec![flat_model("Option", Frequency::Monthly, 100.0)],
    );
    let config = EngineConfig {
        max_periods_per_model: 7,
        ..EngineConfig::default()
    };

    let timeline = schedule_with(&agreement, &config);
    assert_eq!(timeline.terms[0].periodic_payments.len(), 7);
}

// ============================================================================
// Escalation
// ============================================================================

#[test]
fn test_monthly_payments_with_annual_escalation() {
    let mut model = flat_model("Operations", Frequency::Monthly, 1000.0);
    model.periodic_escalation_rate = Some(0.03);
    model.periodic_escalation_frequency = Some(Frequency::Annually);
    let agreement = lease(
        vec![AgreementTerm::new(1, "Operations").with_length_years(2.0)],
        vec![model],
    );

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events.len(), 24);
    assert_close(events[0].payment_amount, 1000.0);
    assert_close(events[11].payment_amount, 1000.0);
    assert_close(events[12].payment_amount, 1030.0);
    assert_close(events[23].payment_amount, 1030.0);
}

#[test]
fn test_linear_increase_per_period() {
    let mut model = flat_model("Operations", Frequency::Annually, 1000.0);
    model.increase_amount = Some(50.0);
    let agreement = lease(
        vec![AgreementTerm::new(1, "Operations").with_length_years(3.0)],
        vec![model],
    );

    let timeline = schedule(&agreement);
    let amounts: Vec<f64> = timeline.terms[0]
        .periodic_payments
        .iter()
        .map(|e| e.payment_amount)
        .collect();
    assert_eq!(amounts, vec![1000.0, 1050.0, 1100.0]);
}

#[test]
fn test_extension_term_escalation() {
    let mut extension = AgreementTerm::new(2, "Extension")
        .with_length_years(1.0)
        .with_payment_model("Operations")
        .as_extension();
    extension.escalation_rate = Some(0.10);
    let agreement = lease(
        vec![
            AgreementTerm::new(1, "Operations").with_length_years(1.0),
            extension,
        ],
        vec![flat_model("Operations", Frequency::Annually, 1000.0)],
    );

    let timeline = schedule(&agreement);
    assert_close(timeline.terms[0].periodic_payments[0].payment_amount, 1000.0);
    assert_close(timeline.terms[1].periodic_payments[0].payment_amount, 1100.0);
    assert_eq!(timeline.terms[1].periodic_payments[0].model_id, "Operations/2");
}

// ============================================================================
// Payment lags
// ============================================================================

#[test]
fn test_first_and_subsequent_lags() {
    let mut model = flat_model("Option", Frequency::Quarterly, 500.0);
    model.first_payment_lag = Some(30.0);
    model.subsequent_payment_lag = Some(10.0);
    let agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(1.0)],
        vec![model],
    );

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events[0].late_payment_date, Some(d(2024, 1, 31)));
    assert_eq!(events[1].payment_date, d(2024, 4, 1));
    assert_eq!(events[1].late_payment_date, Some(d(2024, 4, 11)));
    assert_eq!(events[1].due_date(), d(2024, 4, 11));
}

#[test]
fn test_lags_suppressed_on_extensions() {
    let mut model = flat_model("Operations", Frequency::Annually, 500.0);
    model.first_payment_lag = Some(30.0);
    let agreement = lease(
        vec![
            AgreementTerm::new(1, "Operations").with_length_years(1.0),
            AgreementTerm::new(2, "Extension")
                .with_length_years(1.0)
                .with_payment_model("Operations")
                .as_extension(),
        ],
        vec![model.clone()],
    );

    let timeline = schedule(&agreement);
    assert!(timeline.terms[0].periodic_payments[0].late_payment_date.is_some());
    assert_eq!(timeline.terms[1].periodic_payments[0].late_payment_date, None);

    model.apply_payment_lag_to_extension = true;
    let mut agreement = agreement;
    agreement.term_payment_models = vec![model];
    let timeline = schedule(&agreement);
    assert_eq!(
        timeline.terms[1].periodic_payments[0].late_payment_date,
        Some(d(2025, 1, 31))
    );
}

// ============================================================================
// Payees
// ============================================================================

#[test]
fn test_split_across_grantors() {
    let mut agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(1.0)],
        vec![flat_model("Option", Frequency::Annually, 1200.0)],
    );
    agreement.grantor = vec![
        Grantor::new("Smith").with_split(60.0),
        Grantor::new("Jones").with_split(40.0),
    ];

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events.len(), 2);
    let by_payee = |name: &str| events.iter().find(|e| e.payee == name).unwrap().payment_amount;
    assert_close(by_payee("Smith"), 720.0);
    assert_close(by_payee("Jones"), 480.0);
    assert_ne!(events[0].event_id, events[1].event_id);
}

#[test]
fn test_uneven_split_sums_to_total() {
    let mut agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(1.0)],
        vec![flat_model("Option", Frequency::Annually, 1000.0)],
    );
    agreement.grantor = vec![Grantor::new("A"), Grantor::new("B"), Grantor::new("C")];

    let timeline = schedule(&agreement);
    let total: f64 = timeline.terms[0]
        .periodic_payments
        .iter()
        .map(|e| e.payment_amount)
        .sum();
    assert_close(total, 1000.0);
}

#[test]
fn test_payee_override() {
    let mut model = flat_model("Option", Frequency::Annually, 1200.0);
    model.payee = Some("Escrow Agent".to_string());
    let mut agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(1.0)],
        vec![model],
    );
    agreement.grantor = vec![Grantor::new("Smith"), Grantor::new("Jones")];

    let timeline = schedule(&agreement);
    let events = &timeline.terms[0].periodic_payments;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payee, "Escrow Agent");
    assert_eq!(events[0].payment_amount, 1200.0);
}

// ============================================================================
// Skipped terms
// ============================================================================

#[test]
fn test_unrecognized_frequency_skips_term() {
    let agreement = lease(
        vec![
            AgreementTerm::new(1, "Option").with_length_years(1.0),
            AgreementTerm::new(2, "Operations").with_length_years(1.0),
        ],
        vec![
            flat_model("Option", Frequency::parse("Fortnightly"), 100.0),
            flat_model("Operations", Frequency::Annually, 1000.0),
        ],
    );

    let timeline = schedule(&agreement);
    assert!(timeline.terms[0].periodic_payments.is_empty());
    assert_eq!(
        timeline.terms[0].skip_reason,
        Some(SkipReason::UnrecognizedFrequency)
    );
    assert_eq!(timeline.terms[1].periodic_payments.len(), 1);
}

#[test]
fn test_missing_model_skips_term() {
    let agreement = lease(
        vec![
            AgreementTerm::new(1, "Option").with_length_years(1.0),
            AgreementTerm::new(2, "Operations").with_length_years(1.0),
        ],
        vec![
            flat_model("Operations", Frequency::Annually, 1000.0),
            flat_model("Decommissioning", Frequency::Annually, 500.0),
        ],
    );

    let timeline = schedule(&agreement);
    assert_eq!(
        timeline.terms[0].skip_reason,
        Some(SkipReason::MissingPaymentModel)
    );
    assert_eq!(timeline.terms[1].periodic_payments.len(), 1);
}

#[test]
fn test_no_grantors_produces_no_events() {
    let mut agreement = lease(
        vec![AgreementTerm::new(1, "Option").with_length_years(1.0)],
        vec![flat_model("Option", Frequency::Monthly, 100.0)],
    );
    agreement.grantor.clear();

    let timeline = schedule(&agreement);
    assert!(timeline.terms[0].periodic_payments.is_empty());
    assert_eq!(timeline.terms[0].skip_reason, Some(SkipReason::NoPayees));
}
