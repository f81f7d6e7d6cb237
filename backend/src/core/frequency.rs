//! Closed policy enums parsed from document strings
//!
//! Documents carry payment cadence and first-payment policy as free text.
//! These enums make every accepted spelling explicit and keep anything else
//! in an `Unrecognized` variant, which the generators treat as a hard stop
//! rather than guessing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment or escalation cadence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Annually,
    Semiannually,
    Quarterly,
    Monthly,
    /// A single payment covering the whole term
    OncePerTerm,
    /// Anything the engine does not know how to step through
    Unrecognized(String),
}

impl Frequency {
    /// Parse a document value. Matching ignores case, spaces and hyphens.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "annually" | "annual" | "yearly" => Frequency::Annually,
            "semiannually" | "semiannual" | "biannually" => Frequency::Semiannually,
            "quarterly" => Frequency::Quarterly,
            "monthly" => Frequency::Monthly,
            "onceperterm" | "once" | "onetime" => Frequency::OncePerTerm,
            _ => Frequency::Unrecognized(raw.to_string()),
        }
    }

    /// Calendar months per period, `None` for once-per-term and unknown values.
    pub fn months(&self) -> Option<u32> {
        match self {
            Frequency::Annually => Some(12),
            Frequency::Semiannually => Some(6),
            Frequency::Quarterly => Some(3),
            Frequency::Monthly => Some(1),
            Frequency::OncePerTerm | Frequency::Unrecognized(_) => None,
        }
    }

    /// Periods per year: {Annually: 1, Semiannually: 2, Quarterly: 4, Monthly: 12}.
    pub fn per_year(&self) -> Option<u32> {
        self.months().map(|m| 12 / m)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Frequency::Unrecognized(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Frequency::Annually => "Annually",
            Frequency::Semiannually => "Semiannually",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
            Frequency::OncePerTerm => "Once per Term",
            Frequency::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Frequency {
    fn from(raw: String) -> Self {
        Frequency::parse(&raw)
    }
}

impl From<Frequency> for String {
    fn from(freq: Frequency) -> Self {
        freq.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of escalation periods that elapse per payment period.
///
/// Monthly payments with annual escalation give 1/12; annual payments with
/// quarterly escalation give 4. A once-per-term payment never escalates
/// within its term, so the ratio is zero. Returns `None` when either side is
/// unrecognized.
pub fn escalation_ratio(payment: &Frequency, escalation: &Frequency) -> Option<f64> {
    if !payment.is_recognized() || !escalation.is_recognized() {
        return None;
    }
    match (payment.per_year(), escalation.per_year()) {
        (Some(pay), Some(esc)) => Some(esc as f64 / pay as f64),
        _ => Some(0.0),
    }
}

/// When the first payment of a term falls due.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FirstPaymentStart {
    /// On the term start date
    #[default]
    AtTermStart,
    /// On the first January 1 on or after the term start
    FollowingJanuary,
    /// On the first day of the month on or after the term start
    FollowingMonth,
    /// Unknown policy text; scheduled as `AtTermStart`
    Unrecognized(String),
}

impl FirstPaymentStart {
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().to_lowercase();
        if key.contains("january") || key.contains("jan 1") {
            FirstPaymentStart::FollowingJanuary
        } else if key.contains("month") {
            FirstPaymentStart::FollowingMonth
        } else if key.is_empty()
            || key.starts_with("immediate")
            || key.contains("term start")
            || key.contains("commencement")
        {
            FirstPaymentStart::AtTermStart
        } else {
            FirstPaymentStart::Unrecognized(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FirstPaymentStart::AtTermStart => "Term Start",
            FirstPaymentStart::FollowingJanuary => "January 1st Following",
            FirstPaymentStart::FollowingMonth => "First of Following Month",
            FirstPaymentStart::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for FirstPaymentStart {
    fn from(raw: String) -> Self {
        FirstPaymentStart::parse(&raw)
    }
}

impl From<FirstPaymentStart> for String {
    fn from(policy: FirstPaymentStart) -> Self {
        policy.as_str().to_string()
    }
}
