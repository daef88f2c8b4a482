//! The join conversation: steps, validation, the per-applicant state machine
//! and the registry that persists and approves applications.

pub mod attempt;
pub mod prompts;
pub mod registry;
pub mod rules;
pub mod step;

pub use attempt::{Applicant, ApplicantProfile, Effect, Inbound, JoinAttempt};
pub use registry::{ApprovalOutcome, JoinRegistry};
pub use step::Step;
