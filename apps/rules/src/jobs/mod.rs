//! Job postings — vacancy auto-close and the client-facing listing shape.

pub mod listing;
pub mod vacancy;

pub use listing::{format_job, JobListing};
pub use vacancy::VacancyOutcome;
