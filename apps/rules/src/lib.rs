//! Eligibility and progress rules for the job board.
//!
//! - `quota`: free-plan limits on applications, job postings and
//!   applications per job.
//! - `progress`: lesson catalogs and enrollment progress.
//! - `jobs`: vacancy auto-close and the shared job listing shape.
//! - `service`: loads state through a `store`, applies the rules, persists
//!   the results.

pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod progress;
pub mod quota;
pub mod service;
pub mod signals;
pub mod store;
pub mod telemetry;

pub use config::RulesConfig;
pub use errors::AppError;
pub use quota::{ActionKind, DenialReason, QuotaContext, QuotaDecision, QuotaLimits, QuotaPolicy};
pub use service::{EligibilityService, JobUpdate, ProgressUpdate};
pub use signals::Signal;
