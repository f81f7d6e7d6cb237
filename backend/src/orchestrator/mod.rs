//! Orchestrator - batch schedule computation
//!
//! See `engine.rs` for the computation pipeline and `snapshot.rs` for the
//! serializable batch output.

pub mod engine;
pub mod snapshot;

// Re-export main types for convenience
pub use engine::{ComputedSchedule, EngineConfig, ScheduleEngine, ScheduleError};
pub use snapshot::{fingerprint, BatchSnapshot};
