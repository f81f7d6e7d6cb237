//! Amendment Overlay Merger
//!
//! Folds the amendment chain of an original agreement into an effective
//! view of it.
//!
//! - **index**: read-only lookup of documents by agreement group, built once
//!   per batch
//! - **merge**: ordering of amendments and the field-level fold

pub mod index;
pub mod merge;

pub use index::AgreementIndex;
pub use merge::{apply_overlay, overlay_onto, AmendmentSummary, EffectiveAgreement};
