pub mod actor;
pub mod course;
pub mod job;

use thiserror::Error;

pub use actor::{Actor, ActorRow, PlanTier, Role};
pub use course::{CompletionRecord, Course, Enrollment, EnrollmentRow, EnrollmentStatus};
pub use job::{Job, JobRow, JobStatus};

/// Raised when a persisted enum column holds a value this crate does not know.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} value '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
