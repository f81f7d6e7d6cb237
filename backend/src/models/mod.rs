//! Domain models for the agreement schedule engine

pub mod agreement;
pub mod date_model;
pub mod payment;
pub mod term;

// Re-exports
pub use agreement::{Agreement, Grantor, PropertyDescription, Termination};
pub use date_model::DatePaymentModel;
pub use payment::{PaymentDraft, PaymentEvent, PaymentSource};
pub use term::{find_payment_model, AgreementTerm, TermPaymentModel};
