//! Recurrence domain: rules, per-date exceptions, and the projection of
//! both into concrete calendar occurrences.

pub mod exception;
pub mod frequency;
pub mod occurrence;
pub mod projector;
pub mod rule;

pub use exception::{ExceptionKind, ExceptionSet, OccurrenceException};
pub use frequency::Frequency;
pub use occurrence::{DateWindow, DueStatus, ProjectedOccurrence};
pub use projector::{
    natural_index_of, project, project_all, validate_exception, MAX_PROJECTED_OCCURRENCES,
};
pub use rule::{RecurrenceRule, RuleEnd, RuleKind, RuleStatus};
