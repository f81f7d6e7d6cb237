//! Escalation math
//!
//! Documents frequently omit numeric fields, so every entry point here
//! treats a non-finite base or rate as zero before using it.

/// Treat NaN and infinities as zero.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Read an optional numeric fact, defaulting a missing or non-finite value to 0.
pub fn num(value: Option<f64>) -> f64 {
    value.map(sanitize).unwrap_or(0.0)
}

/// `base × (1 + rate)^periods`
///
/// # Example
/// ```
/// use agreement_schedule_core_rs::core::compounding_growth;
///
/// assert_eq!(compounding_growth(100.0, 0.10, 0.0), 100.0);
/// assert!((compounding_growth(100.0, 0.10, 2.0) - 121.0).abs() < 1e-9);
/// ```
pub fn compounding_growth(base: f64, rate: f64, periods: f64) -> f64 {
    let periods = sanitize(periods).max(0.0);
    sanitize(base) * (1.0 + sanitize(rate)).powf(periods)
}

/// `base × (1 + rate × periods)`
pub fn linear_growth(base: f64, rate: f64, periods: f64) -> f64 {
    let periods = sanitize(periods).max(0.0);
    sanitize(base) * (1.0 + sanitize(rate) * periods)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (sanitize(value) * factor).round() / factor
}
