//! Payee splitting
//!
//! Every payment instant is fanned out into one event per payee. Shares come
//! from the grantors' split percentages; grantors without one share the
//! remainder equally, and the whole set is normalized so shares sum to 1.
//!
//! # Critical Invariant
//!
//! The payee amounts of one instant sum exactly to its total. Each share is
//! rounded to the configured precision and the last payee absorbs the
//! rounding residue.

use serde::{Deserialize, Serialize};

use crate::core::growth::{round_to, sanitize};
use crate::models::agreement::Grantor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeShare {
    pub payee: String,

    /// Fraction of each payment, in [0, 1]
    pub share: f64,
}

/// Derive normalized payee shares from the grantor list.
///
/// # Example
/// ```
/// use agreement_schedule_core_rs::models::Grantor;
/// use agreement_schedule_core_rs::schedule::payee::payee_shares;
///
/// let shares = payee_shares(&[
///     Grantor::new("Smith").with_split(50.0),
///     Grantor::new("Jones"),
///     Grantor::new("Lee"),
/// ]);
/// assert_eq!(shares[0].share, 0.5);
/// assert_eq!(shares[1].share, 0.25);
/// ```
pub fn payee_shares(grantors: &[Grantor]) -> Vec<PayeeShare> {
    if grantors.is_empty() {
        return Vec::new();
    }

    let explicit = |g: &Grantor| {
        g.split_percentage
            .map(sanitize)
            .filter(|p| *p >= 0.0)
    };
    let explicit_total: f64 = grantors.iter().filter_map(explicit).sum();
    let unspecified = grantors.iter().filter(|g| explicit(*g).is_none()).count();
    let remainder_each = if unspecified > 0 {
        (100.0 - explicit_total).max(0.0) / unspecified as f64
    } else {
        0.0
    };

    let raw: Vec<f64> = grantors
        .iter()
        .map(|g| explicit(g).unwrap_or(remainder_each))
        .collect();
    let total: f64 = raw.iter().sum();
    let equal = 1.0 / grantors.len() as f64;

    grantors
        .iter()
        .zip(raw)
        .map(|(g, pct)| PayeeShare {
            payee: g.name.trim().to_string(),
            share: if total > 0.0 { pct / total } else { equal },
        })
        .collect()
}

/// Split `total` across `shares`, rounding to `decimals` places.
///
/// The last payee receives `total - sum(others)` so the parts always add
/// back up to the rounded total.
pub fn allocate(total: f64, shares: &[PayeeShare], decimals: u32) -> Vec<(String, f64)> {
    let total = round_to(total, decimals);
    let mut allocated = 0.0;
    let last = shares.len().saturating_sub(1);

    shares
        .iter()
        .enumerate()
        .map(|(i, share)| {
            let amount = if i == last {
                round_to(total - allocated, decimals)
            } else {
                round_to(total * share.share, decimals)
            };
            allocated += amount;
            (share.payee.clone(), amount)
        })
        .collect()
}
