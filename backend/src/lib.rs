//! Agreement Schedule Core - Rust Engine
//!
//! Converts land-agreement facts (leases, options, easements, amendments,
//! deeds) into resolved term timelines and payment schedules.
//!
//! # Architecture
//!
//! - **core**: Date arithmetic, frequency policies, growth math
//! - **models**: Domain types (Agreement, terms, payment models, events)
//! - **schedule**: Term resolution and payment generation
//! - **overlay**: Amendment chain merging
//! - **settlement**: Purchase-price netting
//! - **orchestrator**: Batch pipeline and serializable output
//!
//! # Critical Invariants
//!
//! 1. The engine is a pure function of the document snapshot and config
//! 2. Input documents are never mutated; effective views are new values
//! 3. Every generation loop is bounded
//! 4. A malformed agreement degrades only its own output

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod overlay;
pub mod schedule;
pub mod settlement;

// Re-exports for convenience
pub use crate::core::calendar::{Calendar, GregorianCalendar};
pub use crate::core::frequency::{FirstPaymentStart, Frequency};
pub use models::{
    Agreement, AgreementTerm, DatePaymentModel, Grantor, PaymentEvent, PaymentSource,
    PropertyDescription, TermPaymentModel, Termination,
};
pub use orchestrator::{BatchSnapshot, ComputedSchedule, EngineConfig, ScheduleEngine, ScheduleError};
pub use overlay::{apply_overlay, AgreementIndex, EffectiveAgreement};
pub use schedule::terms::{ResolvedTerm, TermTimeline};
pub use schedule::SkipReason;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn agreement_schedule_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::compute_schedules, m)?)?;
    Ok(())
}
