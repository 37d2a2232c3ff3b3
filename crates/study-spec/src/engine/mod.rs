//! Named builders for the study engine expression language.
//!
//! Every function here only picks an expression name and forwards its arguments to
//! [`build_expression`](crate::expr::build_expression).

pub mod actions;
pub mod conditions;
pub mod participant;
pub mod prefill;
pub mod shortcuts;

pub use actions::{RemoveSelector, ReportDataType, SurveyCategory};
pub use conditions::{Month, OldResponsesCheck, OldResponsesQuery};
pub use participant::ParticipantState;
