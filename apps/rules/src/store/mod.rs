//! Storage seam — everything the rules need loaded, counted or written back.
//!
//! The rules themselves never touch storage. `EligibilityService` reads through
//! this trait, calls the pure rules, and persists what they return.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Actor, CompletionRecord, Course, Enrollment, Job, JobStatus};
use crate::progress::EnrollmentProgress;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait EligibilityStore: Send + Sync {
    async fn load_actor(&self, actor_id: Uuid) -> Result<Option<Actor>, AppError>;

    /// Applications submitted by `applicant_id` at or after `since`.
    async fn count_applications_since(
        &self,
        applicant_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u32, AppError>;

    /// Every job the company ever posted, open or closed.
    async fn count_jobs_posted(&self, company_id: Uuid) -> Result<u32, AppError>;

    async fn count_job_applications(&self, job_id: Uuid) -> Result<u32, AppError>;

    async fn count_accepted_applications(&self, job_id: Uuid) -> Result<u32, AppError>;

    async fn load_job(&self, job_id: Uuid) -> Result<Option<Job>, AppError>;

    async fn save_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<(), AppError>;

    async fn load_enrollment(&self, enrollment_id: Uuid) -> Result<Option<Enrollment>, AppError>;

    async fn load_course(&self, course_id: Uuid) -> Result<Option<Course>, AppError>;

    async fn load_completion_records(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<CompletionRecord>, AppError>;

    async fn insert_completion_record(&self, record: &CompletionRecord) -> Result<(), AppError>;

    /// Writes progress back. Must not clear an existing `completed_at`.
    async fn save_progress(
        &self,
        enrollment_id: Uuid,
        progress: &EnrollmentProgress,
    ) -> Result<(), AppError>;
}
