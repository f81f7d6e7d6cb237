//! Settlement Module
//!
//! Closing payments derived from previously generated schedules.
//!
//! # Example
//!
//! ```rust
//! use agreement_schedule_core_rs::models::{Agreement, Grantor};
//! use agreement_schedule_core_rs::orchestrator::EngineConfig;
//! use agreement_schedule_core_rs::schedule::ScheduleContext;
//! use agreement_schedule_core_rs::settlement;
//! use chrono::NaiveDate;
//!
//! let mut agreement = Agreement::new("OPT-1", "G-1");
//! agreement.full_purchase_price = Some(100_000.0);
//! agreement.date_purchased = NaiveDate::from_ymd_opt(2026, 6, 1);
//! agreement.grantor = vec![Grantor::new("Smith Family Trust")];
//!
//! let config = EngineConfig::default();
//! let ctx = ScheduleContext::new(&agreement, &config);
//! let events = settlement::settle_purchase_price(&ctx, &agreement, &[]);
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].payment_amount, 100_000.0);
//! ```

pub mod purchase;

// Re-export public API
pub use purchase::{applicable_total, settle_purchase_price, SETTLEMENT_MODEL_ID, SETTLEMENT_PAYMENT_TYPE};
