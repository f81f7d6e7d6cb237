//! Purchase-price settlement tests
//!
//! The closing payment is the full price net of payments credited toward
//! the purchase.

use agreement_schedule_core_rs::core::Frequency;
use agreement_schedule_core_rs::models::{
    Agreement, AgreementTerm, DatePaymentModel, Grantor, PaymentEvent, PaymentSource,
    TermPaymentModel, Termination,
};
use agreement_schedule_core_rs::orchestrator::{ComputedSchedule, EngineConfig, ScheduleEngine};
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

fn option_agreement() -> Agreement {
    let mut option = Agreement::new("OPT-1", "G-1");
    option.document_type = "Option".to_string();
    option.effective_date = Some(d(2024, 1, 1));
    option.grantor = vec![Grantor::new("Smith")];
    option.full_purchase_price = Some(100_000.0);
    option.date_purchased = Some(d(2025, 1, 1));

    let mut deposit = DatePaymentModel::one_time("deposit", d(2024, 1, 1), 20_000.0);
    deposit.applicable_to_purchase = true;
    let mut fee = DatePaymentModel::one_time("admin-fee", d(2024, 2, 1), 5_000.0);
    fee.applicable_to_purchase = false;
    option.date_payment_models = vec![deposit, fee];
    option
}

fn compute(agreement: Agreement) -> ComputedSchedule {
    compute_with(agreement, EngineConfig::default())
}

fn compute_with(agreement: Agreement, config: EngineConfig) -> ComputedSchedule {
    let engine = ScheduleEngine::new(config).unwrap();
    engine.compute_batch(&[agreement]).remove(0)
}

fn settlements(schedule: &ComputedSchedule) -> Vec<&PaymentEvent> {
    schedule
        .date_payments
        .iter()
        .filter(|e| e.payment_source == PaymentSource::PurchasePriceCalculation)
        .collect()
}

#[test]
fn test_price_net_of_applicable_payments() {
    let schedule = compute(option_agreement());
    let settled = settlements(&schedule);

    assert_eq!(settled.len(), 1);
    assert_close(settled[0].payment_amount, 80_000.0);
    assert_eq!(settled[0].payment_date, d(2025, 1, 1));
    assert!(settled[0].applicable_to_purchase);
    assert!(!settled[0].refundable);
    assert_eq!(settled[0].payment_type, "Purchase Price");
}

#[test]
fn test_applicable_term_payments_are_credited() {
    let mut agreement = option_agreement();
    agreement.agreement_terms = vec![AgreementTerm::new(1, "Option").with_length_years(2.0)];
    let mut model = TermPaymentModel::new("Option", Frequency::Annually);
    model.flat_payment_amount = Some(10_000.0);
    model.applicable_to_purchase = true;
    agreement.term_payment_models = vec![model];

    let schedule = compute(agreement);

    // Option payments on 2024-01-01 and 2025-01-01 both precede or meet closing
    let settled = settlements(&schedule);
    assert_close(settled[0].payment_amount, 100_000.0 - 20_000.0 - 20_000.0);
}

#[test]
fn test_split_across_grantors() {
    let mut agreement = option_agreement();
    agreement.grantor = vec![Grantor::new("Smith"), Grantor::new("Jones")];

    let schedule = compute(agreement);
    let settled = settlements(&schedule);

    assert_eq!(settled.len(), 2);
    let total: f64 = settled.iter().map(|e| e.payment_amount).sum();
    assert_close(total, 80_000.0);
}

#[test]
fn test_estimated_closing_used_without_purchase_date() {
    let mut agreement = option_agreement();
    agreement.date_purchased = None;
    agreement.estimated_closing_date = Some(d(2025, 6, 30));

    let schedule = compute(agreement);
    assert_eq!(settlements(&schedule)[0].payment_date, d(2025, 6, 30));
}

#[test]
fn test_no_closing_date_no_settlement() {
    let mut agreement = option_agreement();
    agreement.date_purchased = None;

    assert!(settlements(&compute(agreement)).is_empty());
}

#[test]
fn test_terminated_agreement_not_settled() {
    let mut agreement = option_agreement();
    agreement.termination = Some(Termination {
        termination_date: Some(d(2024, 12, 31)),
        ..Default::default()
    });

    assert!(settlements(&compute(agreement)).is_empty());
}

#[test]
fn test_overpaid_remainder_is_negative_by_default() {
    let mut agreement = option_agreement();
    agreement.full_purchase_price = Some(15_000.0);

    let raw = compute(agreement.clone());
    assert_close(settlements(&raw)[0].payment_amount, -5_000.0);

    let config = EngineConfig {
        settlement_floor_at_zero: true,
        ..EngineConfig::default()
    };
    let floored = compute_with(agreement, config);
    assert_eq!(settlements(&floored)[0].payment_amount, 0.0);
}

#[test]
fn test_settlement_sorted_with_date_payments() {
    let schedule = compute(option_agreement());
    let dates: Vec<NaiveDate> = schedule.date_payments.iter().map(|e| e.payment_date).collect();

    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(schedule.date_payments.last().unwrap().payment_source, PaymentSource::PurchasePriceCalculation);
}
