//! Core primitives shared by every schedule component
//!
//! - **calendar**: injected date arithmetic (`Calendar` trait)
//! - **frequency**: closed policy enums parsed from document strings
//! - **growth**: escalation math and numeric sanitizing

pub mod calendar;
pub mod frequency;
pub mod growth;

pub use calendar::{Calendar, GregorianCalendar};
pub use frequency::{FirstPaymentStart, Frequency};
pub use growth::{compounding_growth, linear_growth, num, round_to};
